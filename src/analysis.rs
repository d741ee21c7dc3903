pub use log::{debug, info, warn};

pub use social_choice::*;
pub use snafu::{prelude::*, ErrorCompat, Snafu};

pub use std::fs;
use std::path::Path;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
pub use serde_json::json;
pub use serde_json::Map as JSMap;
pub use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::analysis::config_reader::*;
use crate::analysis::io_common::{resolve_path, simplify_file_name};
use crate::analysis::io_csv::{read_csv_ranking, read_csv_ratings};
use crate::analysis::io_excel::read_excel_ratings;
use crate::args::Args;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

pub const DEFAULT_MAX_CANDIDATES: usize = 7;

#[derive(Debug, Snafu)]
pub enum AnalysisError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Empty Excel worksheet"))]
    EmptyExcel {},
    #[snafu(display("Unexpected cell on line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer"))]
    ParsingJsonNumber {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: expected a number, found {content:?}"))]
    CsvWrongNumber { lineno: usize, content: String },
    #[snafu(display("Provider {provider} needs the setting {setting}"))]
    MissingSetting { provider: String, setting: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Voting error: {source}"))]
    Voting { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// A ballot as read from a file, before validation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u32>,
    pub choices: Vec<String>,
}

/// Everything needed to run one analysis, after merging the command line
/// with the configuration file.
#[derive(Debug, Clone)]
pub struct AnalysisPlan {
    pub name: String,
    pub source: ProfileSource,
    pub rules: Vec<VotingRule>,
    pub unanimity: bool,
    pub strategyproof: bool,
    pub max_candidates: usize,
    pub keep_candidates: Option<Vec<String>>,
    pub keep_voters: Option<Vec<usize>>,
    pub out: Option<String>,
    pub reference: Option<String>,
}

pub fn make_plan(args: &Args) -> AnalysisResult<AnalysisPlan> {
    let config = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };
    let root = args
        .config
        .as_deref()
        .and_then(|p| Path::new(p).parent())
        .map(|p| p.to_path_buf());
    let relative = |p: &str| match &root {
        Some(r) => resolve_path(r, p),
        None => p.to_string(),
    };

    let mut source = config
        .as_ref()
        .map(|c| c.profile_source.clone())
        .unwrap_or_default();
    source.file_path = source.file_path.as_deref().map(relative);
    if let Some(input_type) = &args.input_type {
        source.provider = input_type.clone();
    }
    if source.provider.is_empty() {
        source.provider = "csv".to_string();
    }
    // The command line wins, and is relative to the working directory.
    if args.input.is_some() {
        source.file_path = args.input.clone();
    }
    if args.voters.is_some() {
        source.voters = args.voters;
    }
    if args.candidates.is_some() {
        source.candidates = args.candidates;
    }
    if args.seed.is_some() {
        source.seed = args.seed;
    }

    let rule_names: Option<Vec<String>> = args
        .rules
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.rules.clone()));
    let rules: Vec<VotingRule> = match rule_names {
        Some(names) => names
            .iter()
            .map(|s| VotingRule::from_str(s))
            .collect::<Result<Vec<VotingRule>, VotingErrors>>()
            .context(VotingSnafu {})?,
        None => RULES.to_vec(),
    };

    let checks = config
        .as_ref()
        .and_then(|c| c.checks.clone())
        .unwrap_or_default();
    let sub_profile = config
        .as_ref()
        .and_then(|c| c.sub_profile.clone())
        .unwrap_or_default();
    let output_settings = config
        .as_ref()
        .and_then(|c| c.output_settings.clone())
        .unwrap_or_default();

    let name = output_settings
        .analysis_name
        .clone()
        .or_else(|| source.file_path.as_deref().map(simplify_file_name))
        .unwrap_or_else(|| source.provider.clone());

    let plan = AnalysisPlan {
        name,
        source,
        rules,
        unanimity: checks.unanimity.unwrap_or(true),
        strategyproof: args.strategyproof || checks.strategyproof.unwrap_or(false),
        max_candidates: args
            .max_candidates
            .or(checks.max_candidates)
            .unwrap_or(DEFAULT_MAX_CANDIDATES),
        keep_candidates: args.keep_candidates.clone().or(sub_profile.candidates),
        keep_voters: args.keep_voters.clone().or(sub_profile.voters),
        out: args
            .out
            .clone()
            .or_else(|| output_settings.output_file.as_deref().map(relative)),
        reference: args.reference.clone(),
    };
    debug!("make_plan: {:?}", plan);
    Ok(plan)
}

fn source_path(source: &ProfileSource) -> AnalysisResult<String> {
    source.file_path.clone().context(MissingSettingSnafu {
        provider: source.provider.as_str(),
        setting: "filePath",
    })
}

fn ballots_to_profile(ballots: &[ParsedBallot]) -> AnalysisResult<PreferenceProfile> {
    let mut builder = builder::ProfileBuilder::new();
    for ballot in ballots {
        debug!("ballots_to_profile: {:?}: {:?}", ballot.id, ballot.choices);
        builder
            .add_ballot(&ballot.choices, ballot.count.unwrap_or(1))
            .context(VotingSnafu {})?;
    }
    builder.build().context(VotingSnafu {})
}

pub fn load_profile(source: &ProfileSource) -> AnalysisResult<PreferenceProfile> {
    info!("Loading profile with provider {:?}", source.provider);
    match source.provider.as_str() {
        "csv" => {
            let path = source_path(source)?;
            let ballots = read_csv_ranking(&path, source)?;
            ballots_to_profile(&ballots)
        }
        "ratings_csv" => {
            let path = source_path(source)?;
            let ratings = read_csv_ratings(&path, source)?;
            let profile = ratings_to_profile(&ratings).context(VotingSnafu {})?;
            Ok(PreferenceProfile::new(profile))
        }
        "ratings_xlsx" => {
            let path = source_path(source)?;
            let ratings = read_excel_ratings(&path, source)?;
            let profile = ratings_to_profile(&ratings).context(VotingSnafu {})?;
            Ok(PreferenceProfile::new(profile))
        }
        "random" => {
            let n = source.voters.context(MissingSettingSnafu {
                provider: "random",
                setting: "voters",
            })?;
            let m = source.candidates.context(MissingSettingSnafu {
                provider: "random",
                setting: "candidates",
            })?;
            let mut rng = StdRng::seed_from_u64(source.seed.unwrap_or(0));
            make_random_profile(n, m, &mut rng).context(VotingSnafu {})
        }
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Applies the candidate and voter selection of the plan, if any.
fn reduce_profile(plan: &AnalysisPlan, full: PreferenceProfile) -> AnalysisResult<PreferenceProfile> {
    if plan.keep_candidates.is_none() && plan.keep_voters.is_none() {
        return Ok(full);
    }
    let candidates: Vec<Candidate> = match &plan.keep_candidates {
        Some(names) => names.iter().map(|s| Candidate::from(s.as_str())).collect(),
        None => full.names().to_vec(),
    };
    let mut sub = SubProfile::new(full.profile().clone());
    sub.reduce(&candidates, plan.keep_voters.as_deref())
        .context(VotingSnafu {})?;
    info!(
        "Reduced the profile from {}x{} to {}x{}",
        full.n(),
        full.m(),
        sub.reduced().n(),
        sub.reduced().m()
    );
    Ok(sub.reduced().clone())
}

fn names_js(candidates: &[Candidate]) -> JSValue {
    json!(candidates.iter().map(|c| c.name()).collect::<Vec<&str>>())
}

fn score_table_js(table: &ScoreTable) -> JSValue {
    let mut tally: JSMap<String, JSValue> = JSMap::new();
    for (candidate, score) in table.iter() {
        tally.insert(candidate.name().to_string(), json!(score));
    }
    JSValue::Object(tally)
}

fn scores_js(scores: &Scores) -> (&'static str, JSValue) {
    match scores {
        Scores::Single(table) => ("scores", score_table_js(table)),
        Scores::Rounds(rounds) => {
            let l: Vec<JSValue> = rounds
                .iter()
                .enumerate()
                .map(|(idx, table)| json!({"round": idx + 1, "tally": score_table_js(table)}))
                .collect();
            ("rounds", JSValue::Array(l))
        }
    }
}

fn manipulation_js(check: &ManipulationCheck) -> JSValue {
    match check.witness() {
        None => json!({ "strategyproof": true }),
        Some(m) => json!({
            "strategyproof": false,
            "witness": {
                "voter": m.voter,
                "sincereBallot": names_js(&m.sincere_ballot),
                "strategicBallot": names_js(&m.strategic_ballot),
                "sincereWinner": m.sincere_winner.name(),
                "strategicWinner": m.strategic_winner.name(),
            }
        }),
    }
}

fn pairwise_js(profile: &PreferenceProfile) -> JSValue {
    let m = profile.m();
    let rows: Vec<Vec<u64>> = (0..m)
        .map(|i| {
            (0..m)
                .map(|j| profile.preference_count(i, j).unwrap_or(0))
                .collect()
        })
        .collect();
    json!(rows)
}

fn rule_result_js(
    plan: &AnalysisPlan,
    profile: &PreferenceProfile,
    rule: &VotingRule,
) -> AnalysisResult<JSValue> {
    let outcome = rule.apply(profile.profile()).context(VotingSnafu {})?;
    info!(
        "{}: {:?}",
        rule,
        outcome.ordering.iter().map(|c| c.name()).collect::<Vec<&str>>()
    );
    let mut res: JSMap<String, JSValue> = JSMap::new();
    res.insert("rule".to_string(), json!(rule.name()));
    res.insert("ordering".to_string(), names_js(&outcome.ordering));
    let (key, scores) = scores_js(&outcome.scores);
    res.insert(key.to_string(), scores);
    if plan.unanimity {
        let u = profile.unanimity(rule).context(VotingSnafu {})?;
        res.insert("unanimity".to_string(), json!(u));
    }
    if plan.strategyproof {
        let check = profile
            .strategyproof(rule, plan.max_candidates)
            .context(VotingSnafu {})?;
        res.insert("strategyproof".to_string(), manipulation_js(&check));
    }
    Ok(JSValue::Object(res))
}

/// Loads the profile of the plan and builds the JSON summary.
pub fn run_analysis(plan: &AnalysisPlan) -> AnalysisResult<JSValue> {
    let full = load_profile(&plan.source)?;
    let profile = reduce_profile(plan, full)?;
    info!(
        "Analysing {} voters and {} candidates",
        profile.n(),
        profile.m()
    );

    let mut results: Vec<JSValue> = Vec::new();
    for rule in plan.rules.iter() {
        results.push(rule_result_js(plan, &profile, rule)?);
    }
    Ok(json!({
        "config": {
            "analysis": plan.name,
            "provider": plan.source.provider,
            "voters": profile.n(),
            "candidates": names_js(profile.names()),
            "fingerprint": profile.profile().fingerprint(),
        },
        "pairwise": pairwise_js(&profile),
        "results": results,
    }))
}

fn write_output(out: &str, pretty_js: &str) -> AnalysisResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
        info!("Summary written to {}", out);
    }
    Ok(())
}

pub fn check_reference(reference_path: &str, pretty_js_stats: &str) -> AnalysisResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run(args: &Args) -> AnalysisResult<()> {
    let plan = make_plan(args)?;
    let result_js = run_analysis(&plan)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match &plan.out {
        Some(out) => write_output(out, &pretty_js_stats)?,
        None if plan.reference.is_none() => write_output("stdout", &pretty_js_stats)?,
        None => {}
    }

    if let Some(reference) = &plan.reference {
        check_reference(reference, &pretty_js_stats)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: None,
            input_type: None,
            rules: None,
            voters: None,
            candidates: None,
            seed: None,
            strategyproof: false,
            max_candidates: None,
            keep_candidates: None,
            keep_voters: None,
            verbose: false,
        }
    }

    fn result_for<'a>(js: &'a JSValue, rule: &str) -> &'a JSValue {
        js["results"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["rule"] == rule)
            .unwrap()
    }

    #[test]
    fn sample_from_config() {
        let a = Args {
            config: Some(data_path("sample_config.json")),
            ..args()
        };
        let plan = make_plan(&a).unwrap();
        assert_eq!(plan.name, "sample");
        assert_eq!(plan.rules, RULES.to_vec());
        assert!(plan.strategyproof);
        assert_eq!(plan.source.file_path, Some(data_path("sample_ballots.csv")));

        let js = run_analysis(&plan).unwrap();
        assert_eq!(js["config"]["voters"], 11);
        assert_eq!(js["config"]["candidates"], json!(["a", "b", "c", "d"]));
        assert_eq!(js["pairwise"][0][1], 9);
        for rule in RULES.iter() {
            let r = result_for(&js, rule.name());
            assert_eq!(r["ordering"], json!(["a", "b", "c", "d"]), "{}", rule);
            assert_eq!(r["unanimity"], true, "{}", rule);
            assert_eq!(r["strategyproof"]["strategyproof"], true, "{}", rule);
        }
        let borda = result_for(&js, "borda");
        assert_eq!(borda["scores"], json!({"a": 4, "b": 13, "c": 24, "d": 25}));
        let irv = result_for(&js, "irv");
        assert_eq!(irv["rounds"].as_array().unwrap().len(), 3);
        assert_eq!(irv["rounds"][0]["tally"]["a"], 9);
    }

    #[test]
    fn command_line_overrides_config() {
        let a = Args {
            config: Some(data_path("sample_config.json")),
            rules: Some(vec!["Borda".to_string(), "copeland".to_string()]),
            keep_candidates: Some(vec!["c".to_string(), "d".to_string()]),
            max_candidates: Some(3),
            ..args()
        };
        let plan = make_plan(&a).unwrap();
        assert_eq!(plan.rules, vec![VotingRule::Borda, VotingRule::Copeland]);
        assert_eq!(plan.max_candidates, 3);
        let js = run_analysis(&plan).unwrap();
        assert_eq!(js["config"]["candidates"], json!(["c", "d"]));
        assert_eq!(js["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn manipulable_profile_reports_a_witness() {
        let a = Args {
            input: Some(data_path("manipulable.csv")),
            rules: Some(vec!["borda".to_string()]),
            strategyproof: true,
            ..args()
        };
        let js = run_analysis(&make_plan(&a).unwrap()).unwrap();
        let sp = &result_for(&js, "borda")["strategyproof"];
        assert_eq!(sp["strategyproof"], false);
        assert_eq!(sp["witness"]["voter"], 0);
        assert_eq!(sp["witness"]["sincereWinner"], "b");
        assert_eq!(sp["witness"]["strategicWinner"], "a");
    }

    #[test]
    fn random_and_ratings_providers() {
        let a = Args {
            input_type: Some("random".to_string()),
            voters: Some(15),
            candidates: Some(5),
            seed: Some(42),
            keep_voters: Some(vec![0, 1, 2, 2]),
            ..args()
        };
        let plan = make_plan(&a).unwrap();
        let js = run_analysis(&plan).unwrap();
        assert_eq!(js["config"]["voters"], 4);
        assert_eq!(js, run_analysis(&plan).unwrap());

        let b = Args {
            input: Some(data_path("ratings.csv")),
            input_type: Some("ratings_csv".to_string()),
            ..args()
        };
        let js = run_analysis(&make_plan(&b).unwrap()).unwrap();
        assert_eq!(js["config"]["voters"], 5);
        assert_eq!(js["config"]["candidates"], json!(["00", "01", "02", "03"]));
    }

    #[test]
    fn workbook_provider() {
        let a = Args {
            config: Some(data_path("ratings_xlsx_config.json")),
            ..args()
        };
        let mut plan = make_plan(&a).unwrap();
        assert_eq!(plan.source.provider, "ratings_xlsx");
        assert_eq!(plan.source.file_path, Some(data_path("ratings.xlsx")));
        let js = run_analysis(&plan).unwrap();
        assert_eq!(js["config"]["voters"], 3);
        assert_eq!(js["config"]["candidates"], json!(["00", "01", "02"]));
        // Borda totals: 00=3, 01=2, 02=4.
        assert_eq!(result_for(&js, "borda")["ordering"], json!(["01", "00", "02"]));

        plan.source.worksheet_name = Some("Alternate".to_string());
        plan.source._first_vote_column_index = Some(JSValue::from(2));
        let js = run_analysis(&plan).unwrap();
        assert_eq!(js["config"]["voters"], 2);
        assert_eq!(result_for(&js, "plurality")["ordering"], json!(["00", "01", "02"]));
    }

    #[test]
    fn bad_inputs() {
        let a = Args {
            input_type: Some("random".to_string()),
            ..args()
        };
        assert!(matches!(
            run_analysis(&make_plan(&a).unwrap()),
            Err(AnalysisError::MissingSetting { .. })
        ));

        let b = Args {
            input_type: Some("dominion".to_string()),
            input: Some(data_path("sample_ballots.csv")),
            ..args()
        };
        assert!(run_analysis(&make_plan(&b).unwrap()).is_err());

        let c = Args {
            input: Some(data_path("sample_ballots.csv")),
            rules: Some(vec!["approval".to_string()]),
            ..args()
        };
        assert!(matches!(make_plan(&c), Err(AnalysisError::Voting { .. })));
    }

    #[test]
    fn reference_round_trip() {
        let out = std::env::temp_dir().join("votesim_reference_round_trip.json");
        let out_s = out.display().to_string();
        let a = Args {
            config: Some(data_path("sample_config.json")),
            out: Some(out_s.clone()),
            ..args()
        };
        run(&a).unwrap();

        let checked = Args {
            reference: Some(out_s.clone()),
            ..a.clone()
        };
        run(&checked).unwrap();

        let other = Args {
            config: Some(data_path("sample_config.json")),
            keep_voters: Some(vec![7, 10]),
            reference: Some(out_s),
            ..args()
        };
        assert!(run(&other).is_err());
    }
}
