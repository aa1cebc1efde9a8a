use std::fs;
use std::path::Path;

use tempfile::TempDir;
use trackcurate::ctx::Ctx;
use trackcurate::pipeline::Pipeline;
use trackcurate::pipeline::stage0_scaffold::Stage0Scaffold;
use trackcurate::pipeline::stage1_spots::Stage1Spots;
use trackcurate::pipeline::stage4_curated::Stage4Curated;
use trackcurate::pipeline::stage5_align::Stage5Align;
use trackcurate::pipeline::stage6_features::Stage6Features;
use trackcurate::pipeline::stage7_output::Stage7Output;

const HEADER: &str = "ID,TRACK_ID,POSITION_X,POSITION_Y,FRAME,GFP_cmdn,Cy3_cmdn,DAPI_cmdn,BF_cmdn";

fn write_fixture(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let spots = dir.join("spots.csv");
    let rows = [
        // Track 1: single spot frames 0-1, two spots frames 2-4 (division at 2).
        "1,1,100.0,50.0,0,10.0,1.0,5.0,5.0",
        "2,1,101.0,50.0,1,10.1,1.1,5.0,5.0",
        "3,1,102.0,50.0,2,10.2,1.2,5.0,5.0",
        "4,1,103.0,60.0,2,20.2,11.2,5.0,5.0",
        "5,1,104.0,50.0,3,10.3,1.3,5.0,5.0",
        "6,1,105.0,60.0,3,20.3,11.3,5.0,5.0",
        "7,1,106.0,50.0,4,10.4,1.4,5.0,5.0",
        "8,1,107.0,60.0,4,20.4,11.4,5.0,5.0",
        // Track 2: single spot throughout.
        "9,2,110.0,70.0,0,8.0,2.0,5.0,5.0",
        "10,2,111.0,70.0,1,8.1,2.1,5.0,5.0",
        "11,2,112.0,70.0,2,8.2,2.2,5.0,5.0",
        "12,2,113.0,70.0,3,8.3,2.3,5.0,5.0",
        "13,2,114.0,70.0,4,8.4,2.4,5.0,5.0",
        // Track 3: uncurated, population medians only.
        "14,3,120.0,80.0,0,6.0,3.0,5.0,5.0",
        // Sentinel track id: dropped during cleaning.
        "15,None,130.0,90.0,0,1.0,1.0,1.0,1.0",
    ];
    fs::write(&spots, format!("{}\n{}\n", HEADER, rows.join("\n"))).unwrap();

    let curated = dir.join("curated_tracks.csv");
    fs::write(&curated, "1\n2\n").unwrap();
    (spots, curated)
}

fn align_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1Spots::new()),
        Box::new(Stage4Curated::new()),
        Box::new(Stage5Align::new()),
        Box::new(Stage6Features::new()),
        Box::new(Stage7Output::new()),
    ])
}

fn run_align(dir: &Path) -> Ctx {
    let (spots, curated) = write_fixture(dir);
    let mut ctx = Ctx::new(spots, dir.join("out"), "0.0.0-test");
    ctx.curated_tracks_path = Some(curated);
    ctx.n_frames = 5;
    ctx.n_red = 2;
    ctx.n_green = 1;
    ctx.write_json = true;
    align_pipeline().run(&mut ctx).unwrap();
    ctx
}

#[test]
fn cleaned_table_drops_sentinel_rows() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_align(tmp.path());
    assert_eq!(ctx.dropped_rows, 1);

    let content = fs::read_to_string(&ctx.output.clean_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 15); // header + 14 cleaned rows
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines[1], "1,1,100,50,0,10,1,5,5");
}

#[test]
fn mean_std_table_has_three_decimal_features() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_align(tmp.path());

    let content = fs::read_to_string(&ctx.output.mean_std_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "ID,TRACK_ID,POSITION_X,POSITION_Y,FRAME,GFP_average,GFP_std,Cy3_average,Cy3_std,\
         DAPI_average,DAPI_std,BF_average,BF_std,GFP_nq,Cy3_nq,nq_cls2x1"
    );
    // Track 1, frame 0: curated GFP median is 9 -> nq = 10 - 9 = 1.000.
    assert_eq!(
        lines[1],
        "1,1,100,50,0,9.000,1.414,1.500,0.707,5.000,0.000,5.000,0.000,1.000,-0.500,0"
    );
}

#[test]
fn aligned_table_time_zero_at_division() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_align(tmp.path());

    let aligned = ctx.aligned.as_ref().unwrap();
    assert_eq!(aligned.division_frames.get(&1), Some(&2));

    let content = fs::read_to_string(&ctx.output.intensities_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    // 3 header rows + 5 frame rows.
    assert_eq!(lines.len(), 8);
    assert_eq!(
        lines[0],
        "frame_num,gfp_frame_average,cy3_frame_average,1,1,1,1,1,1,1,2,2,2,2,2,2,2"
    );
    assert_eq!(lines[1], ",,,time,x,y,green,red,green,red,time,x,y,green,red,green,red");
    assert_eq!(lines[2], ",,,,,,median,median,mean,mean,,,,median,median,mean,mean");
    // Frame 0: population medians over all tracks (GFP 10/8/6, Cy3 1/2/3),
    // track 1 already rebased to division at frame 2.
    assert_eq!(lines[3], "0,8,2,-2,100,50,10,1,10,1,0,110,70,8,2,8,2");
    // Frame 2 is the division frame: track 1 time is exactly 0.
    assert_eq!(
        lines[5],
        "2,10.2,2.2,0,102,50,10.2,1.2,10.2,1.2,2,112,70,8.2,2.2,8.2,2.2"
    );
}

#[test]
fn report_json_summarizes_the_run() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_align(tmp.path());
    assert!(ctx.output.report_path.exists());

    let content = fs::read_to_string(&ctx.output.report_path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(report["tool"]["name"], "trackcurate");
    assert_eq!(report["input"]["rows_total"], 15);
    assert_eq!(report["input"]["rows_dropped"], 1);
    assert_eq!(report["input"]["tracks_curated"], 2);
    assert_eq!(report["alignment"]["division_frames_recorded"], 1);
}
