use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "horse-race",
    about = "A real-time multi-round horse race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing
    #[clap(short, long)]
    pub debug: bool,

    /// Run the races in real-time, the running race can be controlled from stdin
    /// (p = pause/resume, r = restart round, q = quit)
    #[clap(short, long)]
    pub live: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the game parameter file (OPTIONAL: if not set, default parameters are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set frame rate in Hz, should be in the range [1.0, 240.0]
    #[clap(short, long, default_value = "60.0")]
    pub frame_rate: f64,

    /// Set seed of the random number generator (OPTIONAL: if not set, every run differs)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set track width used for the visual positions
    #[clap(short, long, default_value = "400.0")]
    pub track_width: f64,

    /// Set path of the result files, .json and .csv are appended (OPTIONAL)
    #[clap(short, long)]
    pub output_path: Option<PathBuf>,

    /// Show the results stored in a .json result file and exit (OPTIONAL)
    #[clap(short, long)]
    pub results_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SimOpts::parse_from(["horse-race"]);
        assert!(!opts.debug);
        assert!(!opts.live);
        assert_eq!(opts.frame_rate, 60.0);
        assert_eq!(opts.track_width, 400.0);
        assert!(opts.seed.is_none());
        assert!(opts.parfile_path.is_none());
        assert!(opts.results_path.is_none());
    }

    #[test]
    fn all_options() {
        let opts = SimOpts::parse_from([
            "horse-race", "-d", "-l", "-p", "pars.json", "-f", "30", "-s", "7", "-t", "800", "-o",
            "out/results",
        ]);
        assert!(opts.debug && opts.live);
        assert_eq!(opts.parfile_path, Some(PathBuf::from("pars.json")));
        assert_eq!(opts.frame_rate, 30.0);
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.track_width, 800.0);
        assert_eq!(opts.output_path, Some(PathBuf::from("out/results")));
    }

    #[test]
    fn results_view() {
        let opts = SimOpts::parse_from(["horse-race", "--results-path", "out/results.json"]);
        assert_eq!(opts.results_path, Some(PathBuf::from("out/results.json")));
    }
}
