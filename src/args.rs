use clap::Parser;

/// This program computes the outcome of ordinal voting rules on a profile of ballots, and checks
/// whether the rules respect unanimity and resist strategic voting on that profile.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the analysis: the source of the ballots, the rules and the
    /// checks to run. Paths inside it are relative to the location of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the summary of an analysis in JSON format. If provided, votesim will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the ballots or the ratings. Setting this option overrides the
    /// path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, ratings_csv, ratings_xlsx or random.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (comma-separated list, default all) The rules to run: plurality, veto, borda, irv, copeland.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub rules: Option<Vec<String>>,

    /// (random input only) The number of voters.
    #[clap(long, value_parser)]
    pub voters: Option<usize>,

    /// (random input only) The number of candidates.
    #[clap(long, value_parser)]
    pub candidates: Option<usize>,

    /// (random input only, default 0) The seed of the random generator.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// If passed as an argument, runs the exhaustive strategy-proofness check for every rule.
    #[clap(long, takes_value = false)]
    pub strategyproof: bool,

    /// (default 7) The strategy-proofness check refuses profiles with more candidates than this.
    #[clap(long, value_parser)]
    pub max_candidates: Option<usize>,

    /// (comma-separated list) Restricts the analysis to these candidates.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub keep_candidates: Option<Vec<String>>,

    /// (comma-separated list of 0-based indices) Restricts the analysis to the ballots of these voters.
    /// An index may be repeated.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub keep_voters: Option<Vec<usize>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
