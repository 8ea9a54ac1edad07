use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a .ttf or .otf font into a runtime-ready .ktf binary.
    #[command(visible_alias = "p")]
    Parse(CompileArgs),

    /// Same as `parse`, with verbose table and pipeline logging.
    Vp(CompileArgs),

    /// Print a summary of an already compiled .ktf file.
    Info {
        /// Compiled font to inspect.
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Output flavor: triangulated meshes or pre-rasterized coverage maps.
    #[arg(value_enum)]
    pub flavor: Flavor,

    /// Pixel height of every rasterized glyph.
    #[arg(value_parser = clap::value_parser!(u16).range(12..=255))]
    pub glyph_height: u16,

    /// Supersampling multiplier handed through to the rasterizer.
    #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
    pub super_sample: u8,

    /// Source font (.ttf or .otf).
    pub input: PathBuf,

    /// Target path for the compiled font (.ktf); must not exist yet.
    pub output: PathBuf,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flavor {
    Bitmap,
    Glyph,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("kalafont").chain(args.iter().copied()))
    }

    #[test]
    fn parse_subcommand_takes_five_arguments() {
        let cli = parse(&["parse", "glyph", "32", "1", "font.ttf", "font.ktf"]).unwrap();
        let Command::Parse(args) = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(args.flavor, Flavor::Glyph);
        assert_eq!(args.glyph_height, 32);
        assert_eq!(args.super_sample, 1);
        assert_eq!(args.input, PathBuf::from("font.ttf"));
        assert_eq!(args.output, PathBuf::from("font.ktf"));
    }

    #[test]
    fn short_alias_works() {
        let cli = parse(&["p", "bitmap", "12", "3", "a.otf", "a.ktf"]).unwrap();
        assert!(matches!(cli.command, Command::Parse(_)));
    }

    #[test]
    fn vp_is_its_own_subcommand() {
        let cli = parse(&["vp", "bitmap", "255", "2", "a.ttf", "a.ktf"]).unwrap();
        assert!(matches!(cli.command, Command::Vp(_)));
    }

    #[test]
    fn glyph_height_range_is_enforced() {
        assert!(parse(&["parse", "glyph", "11", "1", "a.ttf", "a.ktf"]).is_err());
        assert!(parse(&["parse", "glyph", "256", "1", "a.ttf", "a.ktf"]).is_err());
        assert!(parse(&["parse", "glyph", "height", "1", "a.ttf", "a.ktf"]).is_err());
    }

    #[test]
    fn super_sample_range_is_enforced() {
        assert!(parse(&["parse", "glyph", "32", "0", "a.ttf", "a.ktf"]).is_err());
        assert!(parse(&["parse", "glyph", "32", "4", "a.ttf", "a.ktf"]).is_err());
    }

    #[test]
    fn unknown_flavor_is_rejected() {
        assert!(parse(&["parse", "vector", "32", "1", "a.ttf", "a.ktf"]).is_err());
    }
}
