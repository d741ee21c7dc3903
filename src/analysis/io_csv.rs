// Primitives for reading CSV files.

use std::fs::File;

use crate::analysis::{io_common::make_default_id, *};

/// One ballot per line, most preferred candidate first.
pub fn read_csv_ranking(path: &str, cfs: &ProfileSource) -> AnalysisResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);

    let id_idx_o = cfs.id_column_index_int()?;
    let count_idx_o = cfs.count_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let id = match id_idx_o {
            Some(id_idx) => line
                .get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string(),
            None => default_id(lineno),
        };

        let count: u32 = match count_idx_o {
            Some(count_idx) => {
                let s = line.get(count_idx).context(CsvLineTooShortSnafu { lineno })?;
                s.trim()
                    .parse::<u32>()
                    .ok()
                    .context(CsvWrongNumberSnafu { lineno, content: s })?
            }
            None => 1,
        };

        // Trailing empty cells are padding, not choices.
        let choices: Vec<String> = line
            .iter()
            .skip(choices_start_col)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        debug!("read_csv_ranking: {}: {:?}", id, &choices);

        if choices.is_empty() {
            debug!("read_csv_ranking: skipping empty line {}", lineno);
            continue;
        }
        res.push(ParsedBallot {
            id: Some(id),
            count: Some(count),
            choices,
        });
    }
    Ok(res)
}

/// One voter per line, one numeric rating per candidate.
pub fn read_csv_ratings(path: &str, cfs: &ProfileSource) -> AnalysisResult<Vec<Vec<f64>>> {
    let start_col = cfs.first_vote_column_index()?;
    let (records, row_offset) = get_records(path, cfs)?;
    let mut res: Vec<Vec<f64>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let mut cells: Vec<&str> = line.iter().skip(start_col).collect();
        // Trailing empty cells are padding, as for rankings.
        while cells.last().map_or(false, |c| c.trim().is_empty()) {
            cells.pop();
        }
        let mut row: Vec<f64> = Vec::new();
        for cell in cells {
            let x = cell
                .trim()
                .parse::<f64>()
                .ok()
                .context(CsvWrongNumberSnafu {
                    lineno,
                    content: cell,
                })?;
            row.push(x);
        }
        if row.is_empty() {
            continue;
        }
        res.push(row);
    }
    debug!("read_csv_ratings: {} rows from {}", res.len(), path);
    Ok(res)
}

fn get_records(path: &str, cfs: &ProfileSource) -> AnalysisResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        records.next();
    }
    Ok((records, first_row))
}
