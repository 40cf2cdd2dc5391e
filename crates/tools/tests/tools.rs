#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use svparse_tools::simshim::Shim;
use svparse_tools::ShimError;
use tempfile::TempDir;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn file_list_is_expanded_in_place() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("top.sv"), "module top; endmodule\n").unwrap();
    fs::create_dir_all(root.join("rtl")).unwrap();
    fs::write(root.join("rtl/leaf.v"), "module leaf; endmodule\n").unwrap();
    fs::write(
        root.join("files.f"),
        "+incdir+include\n\n-y\n  lib  \nrtl/leaf.v\n+define+DEPTH=4\n",
    )
    .unwrap();

    let shim = Shim::new(root, no_env);
    let out = shim.build(&["top.sv", "-f", "files.f", "--unknown"]).unwrap();

    let r = root.display();
    let expected = format!(
        "<project>\n  <source>{r}/top.sv</source>\n<!-- start: {r}/files.f -->\n  <incdir>{r}/include</incdir>\n  <moddir>{r}/lib</moddir>\n  <source>{r}/rtl/leaf.v</source>\n  <define><name>DEPTH</name><value>4</value></define>\n<!-- end: {r}/files.f -->\n</project>\n"
    );
    assert_eq!(out.xml, expected);
    assert_eq!(out.notices, vec!["Ignoring unknown option: --unknown".to_string()]);
}

#[test]
fn missing_file_list_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let shim = Shim::new(tmp.path(), no_env);
    let err = shim.build(&["-f", "absent.f"]).unwrap_err();
    assert!(matches!(err, ShimError::FileList { .. }));
}

#[test]
fn simshim_binary_writes_stylecheck_xml() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.sv"), "").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_simshim"))
        .args(["a.sv", "+define+X=1", "-bogus"])
        .current_dir(tmp.path())
        .output()
        .expect("run simshim");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Ignoring unknown option: -bogus"));

    let xml = fs::read_to_string(tmp.path().join("stylecheck.xml")).unwrap();
    assert!(xml.starts_with("<project>\n"));
    assert!(xml.ends_with("</project>\n"));
    assert!(xml.contains("<define><name>X</name><value>1</value></define>"));
    assert!(xml.contains("a.sv</source>"));
}

#[test]
fn fixtrace_binary_indents_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fixtrace"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("run fixtrace");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"enter source_text\nconsume MODULE module\nexit source_text\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "|  source_text\n|  + consume MODULE module\n"
    );
}

#[test]
fn absolute_paths_are_kept() {
    let shim = Shim::new(Path::new("/somewhere"), no_env);
    let out = shim.build(&["+incdir+/opt/uvm/src"]).unwrap();
    assert!(out.xml.contains("<incdir>/opt/uvm/src</incdir>"));
}
