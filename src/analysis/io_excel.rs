use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::analysis::*;

/// Reads a voters × candidates ratings matrix from an Excel worksheet.
///
/// Empty rows are skipped. Every other cell from the first vote column on
/// must be numeric.
pub fn read_excel_ratings(path: &str, cfs: &ProfileSource) -> AnalysisResult<Vec<Vec<f64>>> {
    let wrange = get_range(path, cfs)?;
    let first_row = cfs.first_vote_row_index()?;
    let start_col = cfs.first_vote_column_index()?;
    debug!(
        "read_excel_ratings: first row: {} first column: {}",
        first_row, start_col
    );

    let mut res: Vec<Vec<f64>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        let lineno = (idx + 1) as u64;
        let cells = row.get(start_col..).unwrap_or(&[]);
        if cells.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        let mut ratings: Vec<f64> = Vec::with_capacity(cells.len());
        for cell in cells {
            ratings.push(read_rating_cell(cell, lineno)?);
        }
        res.push(ratings);
    }
    ensure!(!res.is_empty(), EmptyExcelSnafu {});
    debug!("read_excel_ratings: {} rows from {}", res.len(), path);
    Ok(res)
}

fn get_range(path: &str, cfs: &ProfileSource) -> AnalysisResult<calamine::Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    match &cfs.worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path }),
    }
}

fn read_rating_cell(cell: &DataType, lineno: u64) -> AnalysisResult<f64> {
    match cell {
        DataType::Float(f) => Ok(*f),
        DataType::Int(i) => Ok(*i as f64),
        DataType::String(s) => s.trim().parse::<f64>().ok().context(ExcelWrongCellTypeSnafu {
            lineno,
            content: s.clone(),
        }),
        _ => Err(AnalysisError::ExcelWrongCellType {
            lineno,
            content: format!("{:?}", cell),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_cells() {
        assert_eq!(read_rating_cell(&DataType::Float(2.5), 1).unwrap(), 2.5);
        assert_eq!(read_rating_cell(&DataType::Int(3), 1).unwrap(), 3.0);
        assert_eq!(
            read_rating_cell(&DataType::String(" 4 ".to_string()), 1).unwrap(),
            4.0
        );
        assert!(matches!(
            read_rating_cell(&DataType::String("high".to_string()), 7),
            Err(AnalysisError::ExcelWrongCellType { lineno: 7, .. })
        ));
        assert!(read_rating_cell(&DataType::Bool(true), 1).is_err());
        assert!(read_rating_cell(&DataType::Empty, 1).is_err());
    }

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn workbook_source(worksheet: Option<&str>) -> ProfileSource {
        ProfileSource {
            provider: "ratings_xlsx".to_string(),
            _first_vote_row_index: Some(JSValue::from(2)),
            worksheet_name: worksheet.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn reads_first_worksheet() {
        // The header row is skipped, and so is the empty third row.
        let ratings =
            read_excel_ratings(&data_path("ratings.xlsx"), &workbook_source(None)).unwrap();
        assert_eq!(
            ratings,
            vec![vec![4.0, 2.5, 1.0], vec![1.0, 2.0, 3.0], vec![3.0, 3.0, 0.0]]
        );
    }

    #[test]
    fn reads_named_worksheet() {
        let cfs = ProfileSource {
            _first_vote_column_index: Some(JSValue::from(2)),
            ..workbook_source(Some("Alternate"))
        };
        let ratings = read_excel_ratings(&data_path("ratings.xlsx"), &cfs).unwrap();
        assert_eq!(ratings, vec![vec![5.0, 1.0, 3.0], vec![2.0, 4.0, 1.0]]);
    }

    #[test]
    fn worksheet_errors() {
        let path = data_path("ratings.xlsx");
        assert!(matches!(
            read_excel_ratings(&path, &workbook_source(Some("HeaderOnly"))),
            Err(AnalysisError::EmptyExcel {})
        ));
        assert!(matches!(
            read_excel_ratings(&path, &workbook_source(Some("Nope"))),
            Err(AnalysisError::MissingWorksheet { .. })
        ));
        // Without the header skip, the header cells are not ratings.
        let with_header = ProfileSource {
            _first_vote_row_index: None,
            ..workbook_source(None)
        };
        assert!(matches!(
            read_excel_ratings(&path, &with_header),
            Err(AnalysisError::ExcelWrongCellType { lineno: 1, .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        let cfs = ProfileSource {
            provider: "ratings_xlsx".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            read_excel_ratings("/nonexistent/ratings.xlsx", &cfs),
            Err(AnalysisError::OpeningExcel { .. })
        ));
    }
}
