use std::path::PathBuf;

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let script_path = dir.join("script.json");
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    std::fs::write(
        &script_path,
        include_str!("data/arithmetic_script.json"),
    )
    .unwrap();

    let exe = std::env::var_os("CARGO_BIN_EXE_narrascene")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "narrascene.exe"
            } else {
                "narrascene"
            });
            p
        });

    let script_arg = script_path.to_string_lossy().to_string();
    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(exe)
        .args(["frame", "--in", script_arg.as_str(), "--line", "1", "--out"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}
