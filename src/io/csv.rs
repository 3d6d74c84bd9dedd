/*!
# I/O Utilities for Saving Chain History to CSV

This module provides a function to save a recorded chain history to a CSV
file. Enable via the `csv` feature.
*/

use ndarray::Array2;
use std::error::Error;
use std::fs::File;

use csv::Writer;

/**
Saves a chain history as a CSV file.

The data is expected in the shape **draw × dimension**, as produced by
[`HistoryStrategy::sample`] or [`MetropolisHastings::run`].

The resulting CSV file has a header row containing `"sample"` and one column
per dimension named `"dim_0"`, `"dim_1"`, etc.; each subsequent row is one
recorded draw.

[`HistoryStrategy::sample`]: crate::history::HistoryStrategy::sample
[`MetropolisHastings::run`]: crate::metropolis_hastings::MetropolisHastings::run

# Examples

```rust
use adaptive_mh::io::csv::save_csv;
use ndarray::arr2;

let data = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
save_csv(&data, "/tmp/history.csv").expect("Expecting saving data to succeed");
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn save_csv<T: std::fmt::Display>(
    data: &Array2<T>,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    let n_dims = data.ncols();

    let mut header: Vec<String> = vec!["sample".to_string()];
    header.extend((0..n_dims).map(|i| format!("dim_{}", i)));
    wtr.write_record(&header)?;

    for (sample_idx, row) in data.rows().into_iter().enumerate() {
        let mut record = vec![sample_idx.to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_csv_empty_history() {
        let data = Array2::<f64>::zeros((0, 2));
        let file = NamedTempFile::new().expect("Could not create temp file");
        let filename = file.path().to_str().unwrap();

        save_csv(&data, filename).expect("Saving empty history failed");

        let contents = fs::read_to_string(filename).unwrap();
        assert_eq!(contents.trim(), "sample,dim_0,dim_1");
    }

    #[test]
    fn test_save_csv_multi_draw() {
        let data = arr2(&[[1, 2], [3, 4], [5, 6]]);
        let file = NamedTempFile::new().expect("Could not create temp file");
        let filename = file.path().to_str().unwrap();

        save_csv(&data, filename).expect("Saving history failed");

        let contents = fs::read_to_string(filename).unwrap();
        let expected = "\
sample,dim_0,dim_1
0,1,2
1,3,4
2,5,6";
        assert_eq!(contents.trim(), expected);
    }
}
