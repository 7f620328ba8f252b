// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::{get_cmd_output, mwax_fitsview, write_mwax_fits};

fn setup(weights: bool) -> (TempDir, PathBuf) {
    let tmp_dir = TempDir::new().unwrap();
    let file = tmp_dir.path().join("obs.fits");
    // 3 tiles, 2 fine channels, 2 time steps.
    write_mwax_fits(&file, 3, 2, 2, weights);
    (tmp_dir, file)
}

#[test]
fn test_csv_to_stdout() {
    let (_tmp_dir, file) = setup(true);
    #[rustfmt::skip]
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--timestep1", "2",
            "--tile1", "1",
            "--tile2", "2",
            "--channel1", "1",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));
    let (stdout, stderr) = get_cmd_output(&cmd);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "time,baseline,chan,ant1,ant2,xx_r,xx_i,xy_r,xy_i,yx_r,yx_i,yy_r,yy_i",
            // Baselines (1,1), (1,2) and (2,2) are 3, 4 and 5 in a 3-tile file.
            "2,3,1,1,1,238,239,240,241,242,243,244,245",
            "2,4,1,1,2,248,249,250,251,252,253,254,255",
            "2,5,1,2,2,258,259,260,261,262,263,264,265",
        ]
    );
    // Logging goes to stderr so it can't mix with the data.
    assert!(stderr.contains("mwax_fitsview"), "{stderr}");
}

#[test]
fn test_power_column() {
    let (_tmp_dir, file) = setup(false);
    #[rustfmt::skip]
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--timestep2", "1",
            "--mode", "baseline",
            "--tile1", "0",
            "--tile2", "0",
            "--channel2", "0",
            "--power",
        ])
        .ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));
    let (stdout, _) = get_cmd_output(&cmd);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(",yy_i,power"));
    // |100 + 101i| + |106 + 107i|
    let power: f64 = lines[1].rsplit(',').next().unwrap().parse().unwrap();
    let expected = (100.0f64.powi(2) + 101.0f64.powi(2)).sqrt()
        + (106.0f64.powi(2) + 107.0f64.powi(2)).sqrt();
    assert!((power - expected).abs() < 1e-3, "{power} vs {expected}");
}

#[test]
fn test_bad_time_step_order() {
    let (tmp_dir, file) = setup(true);
    let out = tmp_dir.path().join("out.csv");
    #[rustfmt::skip]
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--timestep1", "3",
            "--timestep2", "2",
            "--output-file", out.to_str().unwrap(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(&cmd);
    assert!(
        stderr.contains("timestep1 (3) must be less than or equal to timestep2 (2)"),
        "{stderr}"
    );
    assert!(!stdout.contains("time,baseline"));
    assert!(!out.exists());
}

#[test]
fn test_tile_out_of_range() {
    let (_tmp_dir, file) = setup(true);
    let cmd = mwax_fitsview()
        .args([file.to_str().unwrap(), "--tile2", "3"])
        .ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(&cmd);
    assert!(stdout.is_empty(), "{stdout}");
    assert!(
        stderr.contains("tile2 (3) must be less than the number of tiles (3)"),
        "{stderr}"
    );
}

#[test]
fn test_dry_run() {
    let (tmp_dir, file) = setup(true);
    let out = tmp_dir.path().join("out.csv");
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--output-file",
            out.to_str().unwrap(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));
    let (stdout, _) = get_cmd_output(&cmd);
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(!out.exists());
}

#[test]
fn test_weights() {
    let (tmp_dir, file) = setup(true);
    let out = tmp_dir.path().join("weights.csv");
    #[rustfmt::skip]
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--output", "weights",
            "--autos-only",
            "--output-file", out.to_str().unwrap(),
        ])
        .ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    // 3 autos over 2 time steps.
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "time,baseline,ant1,ant2,xx_w,xy_w,yx_w,yy_w");
    assert_eq!(lines[1], "1,0,0,0,0,0.1,0.2,0.3");
    assert_eq!(lines[2], "1,3,1,1,1.2,1.3,1.4,1.5");
    assert_eq!(lines[6], "2,5,2,2,2,2.1,2.2,2.3");
}

#[test]
fn test_weights_without_weights() {
    let (_tmp_dir, file) = setup(false);
    let cmd = mwax_fitsview()
        .args([file.to_str().unwrap(), "--output", "weights"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(&cmd);
    assert!(stderr.contains("no weights"), "{stderr}");
}

#[test]
fn test_save_toml_and_reuse() {
    let (tmp_dir, file) = setup(true);
    let toml = tmp_dir.path().join("args.toml");
    let out = tmp_dir.path().join("ppd.txt");
    #[rustfmt::skip]
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--output", "ppd",
            "--db",
            "--output-file", out.to_str().unwrap(),
            "--save-toml", toml.to_str().unwrap(),
        ])
        .ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));
    let first = std::fs::read_to_string(&out).unwrap();
    let saved = std::fs::read_to_string(&toml).unwrap();
    assert!(saved.contains("output = \"ppd\""), "{saved}");
    assert!(saved.contains("db = true"), "{saved}");

    // 2 time steps of 2 channels.
    let lines: Vec<&str> = first.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("# "));
    assert!(lines[2].starts_with("1 0 "));
    assert!(lines[5].starts_with("2 1 "));

    std::fs::remove_file(&out).unwrap();
    let cmd = mwax_fitsview().args([toml.to_str().unwrap()]).ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), first);
}

#[test]
fn test_grid_to_stdout() {
    let (_tmp_dir, file) = setup(false);
    #[rustfmt::skip]
    let cmd = mwax_fitsview()
        .args([
            file.to_str().unwrap(),
            "--output", "grid",
            "--timestep1", "1",
            "--timestep2", "1",
        ])
        .ok();
    assert!(cmd.is_ok(), "mwax_fitsview failed: {:?}", get_cmd_output(&cmd));
    let (stdout, _) = get_cmd_output(&cmd);
    let lines: Vec<&str> = stdout.lines().collect();
    // Title, column names, then one line per baseline.
    assert_eq!(lines.len(), 2 + 6);
    assert_eq!(lines[1], "# time_step ant1 ant2 power");
    assert!(lines[2].starts_with("1 0 0 "));
    assert!(lines[7].starts_with("1 2 2 "));
}
