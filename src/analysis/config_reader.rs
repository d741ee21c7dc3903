use crate::analysis::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "analysisName")]
    pub analysis_name: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "firstVoteRowIndex")]
    pub _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "firstVoteColumnIndex")]
    pub _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    // Only for the random provider.
    pub voters: Option<usize>,
    pub candidates: Option<usize>,
    pub seed: Option<u64>,
}

impl ProfileSource {
    /// 0-based index of the first row holding a ballot. Rows are 1-based in the configuration.
    pub fn first_vote_row_index(&self) -> AnalysisResult<usize> {
        match self._first_vote_row_index {
            Some(_) => one_based(&self._first_vote_row_index),
            None => Ok(0),
        }
    }

    /// 0-based index of the first column holding a choice or a rating.
    pub fn first_vote_column_index(&self) -> AnalysisResult<usize> {
        match self._first_vote_column_index {
            Some(_) => one_based(&self._first_vote_column_index),
            None => Ok(0),
        }
    }

    pub fn id_column_index_int(&self) -> AnalysisResult<Option<usize>> {
        match self.id_column_index {
            Some(_) => one_based(&self.id_column_index).map(Some),
            None => Ok(None),
        }
    }

    pub fn count_column_index_int(&self) -> AnalysisResult<Option<usize>> {
        match self.count_column_index {
            Some(_) => one_based(&self.count_column_index).map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Checks {
    pub unanimity: Option<bool>,
    pub strategyproof: Option<bool>,
    #[serde(rename = "maxCandidates")]
    pub max_candidates: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubProfileSettings {
    pub candidates: Option<Vec<String>>,
    /// 0-based voter indices, repetitions allowed.
    pub voters: Option<Vec<usize>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "profileSource")]
    pub profile_source: ProfileSource,
    pub rules: Option<Vec<String>>,
    pub checks: Option<Checks>,
    #[serde(rename = "subProfile")]
    pub sub_profile: Option<SubProfileSettings>,
}

pub fn read_config(path: &str) -> AnalysisResult<AnalysisConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: AnalysisConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> AnalysisResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn one_based(x: &Option<JSValue>) -> AnalysisResult<usize> {
    let idx = read_js_int(x)?;
    ensure!(idx >= 1, ParsingJsonNumberSnafu {});
    Ok(idx - 1)
}

fn read_js_int(x: &Option<JSValue>) -> AnalysisResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
