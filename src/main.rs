mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use tracing::info;

use cli::{Cli, Command, GenerateArgs};
use phar_stub::compactor::{Compactor, PhpCompactor};
use phar_stub::project_config::{self, StubConfig};
use phar_stub::{ExtractCode, MimeType, StubGenerator};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "phar_stub=info"
    } else {
        "phar_stub=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse().context("invalid log directive")?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Compact { input } => run_compact(&input),
        Command::ExtractCode => run_extract_code(),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Some(
            StubConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
        ),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            project_config::load_project_config(&cwd)?
        }
    };

    let config = file_config
        .unwrap_or_default()
        .merge(cli_overrides(&args)?);

    let mut generator = StubGenerator::new();
    config
        .apply(&mut generator)
        .context("invalid stub configuration")?;
    let stub = generator.generate();

    match &args.output {
        Some(path) => {
            write_atomic(path, stub.as_bytes())?;
            info!("stub written to {}", path.display());
        }
        None => print!("{stub}"),
    }
    Ok(())
}

/// Flags only override the file config when they were actually given.
fn cli_overrides(args: &GenerateArgs) -> Result<StubConfig> {
    let mimetypes = if args.mimetypes.is_empty() {
        None
    } else {
        let mut map = IndexMap::new();
        for pair in &args.mimetypes {
            let Some((ext, mime)) = pair.split_once('=') else {
                bail!("invalid mimetype mapping: {pair}. Use EXT=TYPE, e.g. phtml=php");
            };
            map.insert(ext.to_string(), MimeType::from(mime));
        }
        Some(map)
    };

    Ok(StubConfig {
        alias: args.alias.clone(),
        banner: args.banner.clone(),
        shebang: args.shebang.clone(),
        extract: toggle(args.extract, args.no_extract),
        intercept: toggle(args.intercept, args.no_intercept),
        index: args.index.clone(),
        not_found: args.not_found.clone(),
        rewrite: args.rewrite.clone(),
        web: toggle(args.web, args.no_web),
        mimetypes,
        mung: (!args.mung.is_empty()).then(|| args.mung.clone()),
    })
}

/// Maps a `--flag`/`--no-flag` pair to an override.
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents)?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn run_compact(input: &Path) -> Result<()> {
    let compactor = PhpCompactor;
    if !compactor.supports(input) {
        bail!("not a PHP file: {}", input.display());
    }
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    print!("{}", compactor.compact(&source));
    Ok(())
}

fn run_extract_code() -> Result<()> {
    let code = ExtractCode::bundled();
    println!("{}", code.constants_block());
    println!("{}", code.class_block());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["phar-stub", "generate"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Generate(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn unset_flags_do_not_override() {
        let overrides = cli_overrides(&args(&[])).unwrap();
        assert_eq!(overrides, StubConfig::default());
    }

    #[test]
    fn flags_become_overrides() {
        let overrides = cli_overrides(&args(&[
            "--alias",
            "a.phar",
            "--extract",
            "--mimetype",
            "txt=text/plain",
        ]))
        .unwrap();
        assert_eq!(overrides.alias.as_deref(), Some("a.phar"));
        assert_eq!(overrides.extract, Some(true));
        assert_eq!(overrides.web, None);
        assert_eq!(
            overrides.mimetypes.unwrap()["txt"],
            MimeType::Type("text/plain".to_string())
        );
    }

    #[test]
    fn negative_flags_turn_file_settings_off() {
        let file = StubConfig {
            alias: Some("app.phar".to_string()),
            web: Some(true),
            extract: Some(true),
            intercept: Some(true),
            ..Default::default()
        };
        let merged = file.merge(
            cli_overrides(&args(&["--no-web", "--no-extract", "--no-intercept"])).unwrap(),
        );

        assert_eq!(merged.web, Some(false));
        assert_eq!(merged.extract, Some(false));
        assert_eq!(merged.intercept, Some(false));

        let mut generator = StubGenerator::new();
        merged.apply(&mut generator).unwrap();
        assert!(generator.generate().contains("Phar::mapPhar('app.phar');"));
    }

    #[test]
    fn malformed_mimetype_is_rejected() {
        let err = cli_overrides(&args(&["--mimetype", "phtml"])).unwrap_err();
        assert!(err.to_string().contains("EXT=TYPE"));
    }

    #[test]
    fn write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stub.php");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"<?php __HALT_COMPILER();").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<?php __HALT_COMPILER();"
        );
    }
}
