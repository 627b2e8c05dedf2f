use clap::Parser;

#[derive(Debug, Parser, Clone, Default)]
pub struct CliArgs {
    /// Emit machine-readable JSON instead of human-readable output
    #[clap(short, long)]
    pub json: bool,
}

impl CliArgs {
    pub fn json_output(&self) -> bool {
        self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_flag() {
        let args = CliArgs::try_parse_from(["cli", "--json"]).expect("should parse");
        assert!(args.json_output());
    }

    #[test]
    fn json_output_defaults_to_false() {
        let args = CliArgs::try_parse_from(["cli"]).expect("should parse");
        assert!(!args.json_output());
    }
}
