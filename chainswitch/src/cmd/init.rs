//! `chainswitch init`: writes a starter configuration seeded with the
//! built-in chain table.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chainswitch::chain::builtin::BUILTIN_CHAINS;
use chainswitch::config::generate_default_config;
use chainswitch::error::Error;

/// Writes the template to `output`.
///
/// Without `force` the file is created exclusively, so an existing config is
/// never clobbered.
///
/// # Errors
///
/// Returns an error if `output` exists (without `--force`) or cannot be
/// written.
#[allow(clippy::print_stderr)]
pub fn run(output: &Path, force: bool) -> Result<(), Error> {
    let template = generate_default_config()?;

    let mut options = OpenOptions::new();
    if force {
        options.write(true).create(true).truncate(true);
    } else {
        options.write(true).create_new(true);
    }
    let mut file = options.open(output).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::config(format!(
            "'{}' already exists, use --force to overwrite",
            output.display()
        )),
        _ => Error::config_with(format!("cannot create '{}'", output.display()), e),
    })?;
    file.write_all(template.as_bytes())
        .map_err(|e| Error::config_with(format!("failed to write '{}'", output.display()), e))?;

    eprintln!(
        "Wrote {} with {} built-in chains",
        output.display(),
        BUILTIN_CHAINS.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use chainswitch::config::load_config;

    use super::*;

    #[test]
    fn keeps_existing_file_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 1\n").unwrap();

        let err = run(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "port = 1\n");

        run(&path, true).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.registry().unwrap().len(), BUILTIN_CHAINS.len());
    }

    #[test]
    fn creates_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.toml");
        run(&path, false).unwrap();
        assert!(load_config(&path).is_ok());
    }
}
