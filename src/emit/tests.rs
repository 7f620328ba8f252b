// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ndarray::prelude::*;

use super::*;
use crate::query::{FileDimensions, Requirements, SelectionArgs};

fn vis_record() -> VisRecord {
    VisRecord {
        time_step: 1,
        label: 5,
        baseline: 1,
        selected_baseline: 0,
        channel: 0,
        i: 0,
        j: 1,
        values: [1., 2., 3., 4., 5., 6., 7., 8.],
    }
}

fn selection(args: SelectionArgs) -> Selection {
    Selection::new(
        &args,
        FileDimensions {
            num_tiles: 2,
            num_channels: 2,
            num_time_steps: 2,
            has_weights: true,
        },
        Requirements::default(),
    )
    .unwrap()
}

#[test]
fn test_csv_vis_rows() {
    let mut csv = CsvWriter::new(vec![], false);
    csv.write_vis_header().unwrap();
    csv.write_vis(&vis_record()).unwrap();
    assert_eq!(csv.num_rows(), 1);
    let out = String::from_utf8(csv.finish().unwrap()).unwrap();
    assert_eq!(
        out,
        "time,baseline,chan,ant1,ant2,xx_r,xx_i,xy_r,xy_i,yx_r,yx_i,yy_r,yy_i\n5,1,0,0,1,1,2,3,4,5,6,7,8\n"
    );
}

#[test]
fn test_csv_power_column() {
    let mut csv = CsvWriter::new(vec![], true);
    csv.write_vis_header().unwrap();
    let mut r = vis_record();
    r.values = [3., 4., 0., 0., 0., 0., 6., 8.];
    csv.write_vis(&r).unwrap();
    let out = String::from_utf8(csv.finish().unwrap()).unwrap();
    let mut lines = out.lines();
    assert!(lines.next().unwrap().ends_with(",yy_i,power"));
    assert_eq!(lines.next().unwrap(), "5,1,0,0,1,3,4,0,0,0,0,6,8,15");
    assert!(lines.next().is_none());
}

#[test]
fn test_csv_weights_rows() {
    let mut csv = CsvWriter::new(vec![], true);
    csv.write_weights_header().unwrap();
    csv.write_weights(&WeightRecord {
        time_step: 2,
        label: 3,
        baseline: 2,
        selected_baseline: 2,
        i: 1,
        j: 1,
        weights: [1.0, 0.5, 0.5, 1.0],
    })
    .unwrap();
    let out = String::from_utf8(csv.finish().unwrap()).unwrap();
    assert_eq!(
        out,
        "time,baseline,ant1,ant2,xx_w,xy_w,yx_w,yy_w\n3,2,1,1,1,0.5,0.5,1\n"
    );
}

#[test]
fn test_text_report_power_spectrum() {
    let sel = selection(SelectionArgs {
        time_step1: Some(2),
        channel1: Some(1),
        ..Default::default()
    });
    let ppd = Aggregate::PowerSpectrum(array![[[1.0, 2.0]]]);
    let mut report = TextReport::new(vec![]);
    report.report("title", &sel, &ppd).unwrap();
    let out = String::from_utf8(report.into_inner()).unwrap();
    assert_eq!(
        out,
        "# title\n# time_step chan power_x power_y power\n2 1 1 2 3\n"
    );
}

#[test]
fn test_text_report_grid() {
    let sel = selection(SelectionArgs {
        time_step2: Some(1),
        ..Default::default()
    });
    // [time][j][i]
    let grid = Aggregate::Grid(array![[[1.0, 0.0], [2.0, 3.0]]]);
    let mut report = TextReport::new(vec![]);
    report.report("g", &sel, &grid).unwrap();
    let out = String::from_utf8(report.into_inner()).unwrap();
    let lines: Vec<_> = out.lines().skip(2).collect();
    assert_eq!(lines, ["1 0 0 1", "1 0 1 2", "1 1 1 3"]);
}

#[test]
fn test_text_report_phase() {
    let sel = selection(SelectionArgs {
        time_step1: Some(1),
        time_step2: Some(1),
        channel2: Some(0),
        ..Default::default()
    });
    let mut phase = Array4::<f64>::zeros((1, 3, 1, 2));
    phase[(0, 1, 0, 0)] = 90.0;
    phase[(0, 1, 0, 1)] = -45.0;
    let mut report = TextReport::new(vec![]);
    report.report("p", &sel, &Aggregate::Phase(phase)).unwrap();
    let out = String::from_utf8(report.into_inner()).unwrap();
    let lines: Vec<_> = out.lines().skip(2).collect();
    assert_eq!(lines, ["1 0 0 0 0 0", "1 0 1 0 90 -45", "1 1 1 0 0 0"]);
}

#[cfg(feature = "plotting")]
mod plotting {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_layout_overrides() {
        let dir = std::path::Path::new("plots");
        // 5 panels: floor(sqrt(5)) = 2 rows, ceil(5 / 2) = 3 columns.
        assert_eq!(PngPlotter::new(dir, "f", None, None).layout(5), (2, 3));
        assert_eq!(PngPlotter::new(dir, "f", Some(1), None).layout(5), (1, 5));
        assert_eq!(PngPlotter::new(dir, "f", None, Some(2)).layout(5), (3, 2));
        assert_eq!(PngPlotter::new(dir, "f", Some(2), Some(4)).layout(5), (2, 4));
        assert_eq!(PngPlotter::new(dir, "f", None, None).layout(1), (1, 1));
    }

    #[test]
    fn test_png_plots_are_written() {
        let tmp_dir = TempDir::new().unwrap();
        // Doesn't exist yet; the plotter makes it.
        let plot_dir = tmp_dir.path().join("plots");
        let mut plotter = PngPlotter::new(&plot_dir, "obs", None, Some(2));

        let sel = selection(SelectionArgs::default());
        let ppd = Aggregate::PowerSpectrum(Array3::from_shape_fn((2, 2, 2), |(t, c, p)| {
            (t * 4 + c * 2 + p) as f64
        }));
        plotter.report("ppd", &sel, &ppd).unwrap();
        let grid = Aggregate::Grid(array![[[1.0, 0.0], [2.0, 3.0]], [[4.0, 0.0], [5.0, 6.0]]]);
        plotter.report("grid", &sel, &grid).unwrap();

        let sel = selection(SelectionArgs {
            time_step1: Some(1),
            time_step2: Some(1),
            ..Default::default()
        });
        let phase = Aggregate::Phase(Array4::from_shape_fn((1, 3, 2, 2), |(_, b, c, p)| {
            (b as f64 * 60.0) - (c + p) as f64 * 45.0
        }));
        plotter.report("phase", &sel, &phase).unwrap();

        let written = plotter.written();
        assert_eq!(
            written,
            [
                plot_dir.join("obs_ppd.png"),
                plot_dir.join("obs_grid.png"),
                plot_dir.join("obs_phase.png"),
            ]
        );
        for path in written {
            assert!(path.exists(), "{} wasn't written", path.display());
            assert!(std::fs::metadata(path).unwrap().len() > 0);
        }
    }
}
