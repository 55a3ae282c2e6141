use console::style;

/// Print a version (or an empty line when there is none) on stdout
pub fn display_version(version: Option<&str>) {
    println!("{}", version.unwrap_or_default());
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Error chain from an `anyhow::Error`, one cause per line
pub fn format_error_chain(error: &anyhow::Error) -> String {
    let mut lines = vec![error.to_string()];
    lines.extend(error.chain().skip(1).map(|cause| format!("  caused by: {}", cause)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_format_error_chain() {
        let err = Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
            .context("Failed to load configuration")
            .unwrap_err();
        assert_eq!(
            format_error_chain(&err),
            "Failed to load configuration\n  caused by: missing"
        );
    }

    #[test]
    fn test_format_single_error() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(format_error_chain(&err), "boom");
    }
}
