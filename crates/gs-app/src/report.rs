use std::fmt::{self, Write};

use gs_core::feature::{Feature, FeatureMap};
use gs_core::grain::Grain;
use gs_core::layout::GrainPoint;
use serde::Serialize;

/// JSON view of one grain: position and descriptors, no samples.
#[derive(Serialize)]
struct GrainRow<'a> {
    index: usize,
    source_offset: usize,
    valid_len: usize,
    len: usize,
    features: &'a FeatureMap,
}

/// JSON document for a whole analysis run.
#[derive(Serialize)]
struct Report<'a> {
    sample_rate: f64,
    grain_length_ms: f64,
    rolloff_percentile: f32,
    grains: Vec<GrainRow<'a>>,
}

/// Parameters echoed in the report header.
pub struct RunInfo {
    pub sample_rate: f64,
    pub grain_length_ms: f64,
    pub rolloff_percentile: f32,
}

/// Aligned text table, one row per grain.
#[must_use]
pub fn table(grains: &[Grain], features: &[Feature]) -> String {
    let mut out = String::new();
    // fmt::Write sur String est infaillible
    write_table(&mut out, grains, features).map_or_else(|_| String::new(), |()| out)
}

fn write_table(out: &mut impl Write, grains: &[Grain], features: &[Feature]) -> fmt::Result {
    write!(out, "{:>6} {:>10} {:>6}", "grain", "offset", "len")?;
    for f in features {
        write!(out, " {:>12}", f.short_name())?;
    }
    writeln!(out)?;

    for grain in grains {
        write!(
            out,
            "{:>6} {:>10} {:>6}",
            grain.index(),
            grain.source_offset(),
            grain.valid_len()
        )?;
        for &f in features {
            match grain.feature(f) {
                Some(v) => write!(out, " {v:>12.6}")?,
                None => write!(out, " {:>12}", "-")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Pretty-printed JSON report.
///
/// # Errors
/// Returns an error if serialization fails (non-finite values are written as `null`).
pub fn json(grains: &[Grain], info: &RunInfo) -> serde_json::Result<String> {
    let report = Report {
        sample_rate: info.sample_rate,
        grain_length_ms: info.grain_length_ms,
        rolloff_percentile: info.rolloff_percentile,
        grains: grains
            .iter()
            .map(|g| GrainRow {
                index: g.index(),
                source_offset: g.source_offset(),
                valid_len: g.valid_len(),
                len: g.len(),
                features: g.features(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

/// Scatter coordinates, `index x y` per line.
#[must_use]
pub fn points(points: &[GrainPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{} {} {}\n", p.grain_index, p.x, p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grains() -> Vec<Grain> {
        let mut a = Grain::new(0, 0, vec![0.0; 4], 4);
        a.set_feature(Feature::Rms, 0.25);
        let b = Grain::new(1, 4, vec![0.0; 4], 1);
        vec![a, b]
    }

    #[test]
    fn table_marks_missing_values() {
        let text = table(&grains(), &[Feature::Rms]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("rms"));
        assert!(lines[1].trim_end().ends_with("0.250000"));
        assert!(lines[2].trim_end().ends_with('-'));
    }

    struct Refuse;

    impl Write for Refuse {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn table_writer_errors_propagate() {
        assert!(write_table(&mut Refuse, &grains(), &[Feature::Rms]).is_err());
        let mut out = String::new();
        assert!(write_table(&mut out, &grains(), &[]).is_ok());
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn json_has_feature_names() {
        let info = RunInfo {
            sample_rate: 44100.0,
            grain_length_ms: 100.0,
            rolloff_percentile: 0.85,
        };
        let text = json(&grains(), &info).unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
        assert_eq!(value["grains"][0]["features"]["rms"], 0.25);
        assert_eq!(value["grains"][1]["valid_len"], 1);
        assert!(value["grains"][1]["features"].as_object().is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn points_one_line_each() {
        let text = points(&[
            GrainPoint {
                grain_index: 3,
                x: 10,
                y: 20,
            },
            GrainPoint {
                grain_index: 4,
                x: 0,
                y: 599,
            },
        ]);
        assert_eq!(text, "3 10 20\n4 0 599\n");
    }
}
