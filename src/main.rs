//! Z-Secure Vault - CLI
//!
//! Command-line interface over the Z-Secure engine. Face encodings and
//! detected-face geometry are supplied as JSON fixture files produced by an
//! external provider; the CLI injects them through the
//! `FaceGeometryProvider` seam.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use zsecure_vault::crypto::keys::AUDIT_SALT_LEN;
use zsecure_vault::provider::{FaceGeometryProvider, JsonFixtureProvider};
use zsecure_vault::{
    encoding::MatcherConfig, liveness::CaptureFrame, Container, EngineConfig, FaceEncoding,
    ZsecureEngine,
};

#[derive(Parser)]
#[command(name = "zsecure")]
#[command(version = zsecure_vault::VERSION)]
#[command(about = "Z-Secure Vault - Biometric-keyed image encryption")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt an image with a key derived from a face encoding
    Encrypt {
        /// Image to encrypt
        image: PathBuf,

        /// Face-encoding JSON fixture
        #[arg(short, long)]
        encoding: PathBuf,

        /// Identity string bound into the key
        #[arg(short, long)]
        identity: String,

        /// Output container path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decrypt a Z-Secure container
    Decrypt {
        /// Container to decrypt
        container: PathBuf,

        /// Face-encoding JSON fixture
        #[arg(short, long)]
        encoding: PathBuf,

        /// Identity string bound into the key
        #[arg(short, long)]
        identity: String,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show container metadata without decrypting
    Inspect {
        /// Container file
        file: PathBuf,
    },

    /// Check whether a file is a Z-Secure container
    Detect {
        /// File to check
        file: PathBuf,
    },

    /// Match a probe encoding against a stored one
    Match {
        /// Stored encoding JSON
        stored: PathBuf,

        /// Probe encoding JSON
        probe: PathBuf,

        /// Match tolerance (maximum Euclidean distance)
        #[arg(short, long)]
        tolerance: Option<f64>,
    },

    /// Run the liveness check over a capture frame
    Liveness {
        /// Capture frame image
        frame: PathBuf,

        /// Detected-face JSON fixture (omit to simulate no detection)
        #[arg(short, long)]
        face: Option<PathBuf>,
    },

    /// Print the salted audit fingerprint of a derived key
    Fingerprint {
        /// Face-encoding JSON fixture
        #[arg(short, long)]
        encoding: PathBuf,

        /// Identity string bound into the key
        #[arg(short, long)]
        identity: String,

        /// Audit salt as hex (random when omitted)
        #[arg(short, long)]
        salt: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_encoding(path: &PathBuf) -> Result<FaceEncoding> {
    let provider = JsonFixtureProvider::from_files(Some(path.as_path()), None)
        .with_context(|| format!("reading encoding fixture {}", path.display()))?;
    provider
        .face_encoding(&[])?
        .context("fixture contains no face encoding")
}

fn run(cli: Cli) -> Result<()> {
    let engine = ZsecureEngine::default();

    match cli.command {
        Commands::Encrypt {
            image,
            encoding,
            identity,
            output,
        } => {
            let encoding = load_encoding(&encoding)?;
            let key = engine.derive_key(&encoding, &identity)?;

            let written = engine.encrypt_file(&image, &output, &key)?;
            println!("🔐 Encrypted {} -> {}", image.display(), output.display());
            println!("   Container size: {written} bytes");
        }

        Commands::Decrypt {
            container,
            encoding,
            identity,
            output,
        } => {
            let encoding = load_encoding(&encoding)?;
            let key = engine.derive_key(&encoding, &identity)?;

            let plaintext = engine.decrypt_file(&container, &key)?;
            std::fs::write(&output, &plaintext)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("🔓 Decrypted {} -> {}", container.display(), output.display());
            println!("   Image size: {} bytes", plaintext.len());
        }

        Commands::Inspect { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let metadata = Container::peek_metadata(&data)?;

            println!("📦 {}", file.display());
            println!("   Algorithm:  {}", metadata.algorithm);
            println!("   Timestamp:  {}", metadata.timestamp);
            println!("   IV:         {} (base64)", metadata.iv);
            println!("   Total size: {} bytes", data.len());
        }

        Commands::Detect { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            if Container::detect(&data) {
                println!("✅ {} is a Z-Secure container", file.display());
            } else {
                println!("❌ {} is not a Z-Secure container", file.display());
            }
        }

        Commands::Match {
            stored,
            probe,
            tolerance,
        } => {
            let stored = load_encoding(&stored)?;
            let probe = load_encoding(&probe)?;

            let engine = match tolerance {
                Some(tolerance) => ZsecureEngine::new(EngineConfig {
                    matcher: MatcherConfig {
                        tolerance,
                        ..Default::default()
                    },
                    ..Default::default()
                }),
                None => engine,
            };

            if engine.match_face(&stored, &probe)? {
                println!("✅ Match accepted");
            } else {
                println!("❌ Match rejected");
            }
        }

        Commands::Liveness { frame, face } => {
            let image = image::open(&frame)
                .with_context(|| format!("loading frame {}", frame.display()))?
                .to_luma8();

            let provider = JsonFixtureProvider::from_files(None, face.as_deref())?;
            let detected = provider.detect_face(&image)?;

            let report =
                engine.assess_liveness(&CaptureFrame::new(&image, detected.as_ref()));

            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.passed {
                println!("✅ Liveness check passed");
            } else {
                println!("❌ Liveness check failed");
            }
        }

        Commands::Fingerprint {
            encoding,
            identity,
            salt,
        } => {
            let encoding = load_encoding(&encoding)?;
            let key = engine.derive_key(&encoding, &identity)?;

            let salt: [u8; AUDIT_SALT_LEN] = match salt {
                Some(hex_salt) => {
                    let raw = hex::decode(&hex_salt).context("salt is not valid hex")?;
                    match raw.try_into() {
                        Ok(salt) => salt,
                        Err(raw) => bail!(
                            "salt must be {AUDIT_SALT_LEN} bytes, got {}",
                            raw.len()
                        ),
                    }
                }
                None => zsecure_vault::crypto::generate_audit_salt(),
            };

            let fingerprint = engine.key_fingerprint(&key, &salt);
            println!("Salt:        {}", hex::encode(salt));
            println!("Fingerprint: {}", hex::encode(fingerprint));
        }
    }

    Ok(())
}
