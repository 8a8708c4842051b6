//! Run-length segmentation of regime labels into contiguous intervals.

use crate::regime::{LabelMode, RegimeSegment, RegimeSeries};

/// Collapse consecutive equally-labeled timesteps into maximal inclusive
/// intervals.
///
/// Single linear pass over the rows of `series` exactly as given: a series
/// filtered to a shorter window yields boundaries contracted to the window
/// edges, never boundaries from rows outside the window. The output covers
/// the full span of the input exactly once, and adjacent segments never share
/// a label.
pub fn segment(series: &RegimeSeries, mode: LabelMode) -> Vec<RegimeSegment> {
    let mut segments = Vec::new();
    let mut points = series.points.iter();
    let Some(first) = points.next() else {
        return segments;
    };

    let mut run_label = first.label_for(mode);
    let mut run_start = first.date;
    let mut run_end = first.date;

    for point in points {
        let label = point.label_for(mode);
        if label != run_label {
            segments.push(RegimeSegment::new(run_start, run_end, run_label));
            run_label = label;
            run_start = point.date;
        }
        run_end = point.date;
    }

    segments.push(RegimeSegment::new(run_start, run_end, run_label));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::RegimePoint;
    use chrono::NaiveDate;
    use fnv::FnvHashMap;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn series_of(labels: &[u32]) -> RegimeSeries {
        let k = labels.iter().copied().max().map(|max| max + 1).unwrap_or(1);
        let points = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| RegimePoint {
                date: NaiveDate::from_ymd_opt(2023, 1, i as u32 + 1).unwrap(),
                price: 40_000.0 + i as f64,
                label,
                smoothed: None,
                probabilities: FnvHashMap::default(),
            })
            .collect();
        RegimeSeries::new(k, points).unwrap()
    }

    #[test]
    fn test_segment_maximal_runs() {
        let series = series_of(&[0, 0, 1, 1, 1, 2]);
        let segments = segment(&series, LabelMode::Exact);

        assert_eq!(
            segments,
            vec![
                RegimeSegment::new(date("2023-01-01"), date("2023-01-02"), 0),
                RegimeSegment::new(date("2023-01-03"), date("2023-01-05"), 1),
                RegimeSegment::new(date("2023-01-06"), date("2023-01-06"), 2),
            ]
        );
    }

    #[test]
    fn test_segment_empty_series() {
        let series = RegimeSeries::default();
        assert!(segment(&series, LabelMode::Exact).is_empty());
    }

    #[test]
    fn test_segment_single_row() {
        let series = series_of(&[1]);
        let segments = segment(&series, LabelMode::Exact);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, segments[0].end);
        assert_eq!(segments[0].label, 1);
    }

    #[test]
    fn test_segment_trailing_run_always_closed() {
        let series = series_of(&[0, 1, 1]);
        let segments = segment(&series, LabelMode::Exact);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].end, date("2023-01-03"));
    }

    #[test]
    fn test_segments_cover_span_without_label_repeats() {
        let series = series_of(&[2, 2, 0, 1, 1, 0, 0, 0]);
        let segments = segment(&series, LabelMode::Exact);

        assert_eq!(segments.first().unwrap().start, series.first_date().unwrap());
        assert_eq!(segments.last().unwrap().end, series.last_date().unwrap());
        for pair in segments.windows(2) {
            assert_ne!(pair[0].label, pair[1].label);
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_segment_operates_on_visible_rows_only() {
        let series = series_of(&[0, 0, 1, 1, 1, 2]);
        let window = series
            .filter_by_date(Some(date("2023-01-04")), Some(date("2023-01-06")))
            .unwrap();

        let segments = segment(&window, LabelMode::Exact);

        // boundaries contract to the window edges: the run of 1s starts at
        // the first visible row, not at its unfiltered start
        assert_eq!(
            segments,
            vec![
                RegimeSegment::new(date("2023-01-04"), date("2023-01-05"), 1),
                RegimeSegment::new(date("2023-01-06"), date("2023-01-06"), 2),
            ]
        );
    }

    #[test]
    fn test_segment_smoothed_mode_reads_smoothed_labels() {
        let mut series = series_of(&[0, 0, 1]);
        series.points[1].smoothed = Some(1);

        let exact = segment(&series, LabelMode::Exact);
        assert_eq!(exact.len(), 2);

        // under smoothed labels the middle row joins the trailing run
        let smoothed = segment(&series, LabelMode::Smoothed);
        assert_eq!(
            smoothed,
            vec![
                RegimeSegment::new(date("2023-01-01"), date("2023-01-01"), 0),
                RegimeSegment::new(date("2023-01-02"), date("2023-01-03"), 1),
            ]
        );
    }
}
