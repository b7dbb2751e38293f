//! psictl integration tests

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn psictl(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_psictl"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute psictl");

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_stdin_stdout_roundtrip() {
    let packed = psictl(&["-e"], b"<doc>hello</doc>");
    assert!(packed.status.success());
    assert!(packed.stdout.starts_with(b"<compressed alg=lzw len="));
    assert_eq!(&packed.stdout[40..47], b"<crc=0x");

    let unpacked = psictl(&["-d"], &packed.stdout);
    assert!(unpacked.status.success());
    assert_eq!(unpacked.stdout, b"<doc>hello</doc>");
}

#[test]
fn test_empty_stdin() {
    let packed = psictl(&["-e"], b"");
    assert!(packed.status.success());

    let unpacked = psictl(&["-d"], &packed.stdout);
    assert!(unpacked.status.success());
    assert!(unpacked.stdout.is_empty());
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("in.xml");
    let packed = dir.path().join("in.psi");
    let unpacked = dir.path().join("out.xml");

    let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(&plain, &data).unwrap();

    let out = psictl(
        &["-e", "-i", plain.to_str().unwrap(), "-o", packed.to_str().unwrap()],
        b"",
    );
    assert!(out.status.success());
    assert!(out.stdout.is_empty());

    let out = psictl(
        &["-d", "-i", packed.to_str().unwrap(), "-o", unpacked.to_str().unwrap()],
        b"",
    );
    assert!(out.status.success());
    assert_eq!(fs::read(&unpacked).unwrap(), data);
}

#[test]
fn test_corrupt_input_fails() {
    let mut packed = psictl(&["-e"], b"some payload").stdout;
    let last = packed.len() - 1;
    packed[last] ^= 0xff;

    let out = psictl(&["-d"], &packed);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("checksum"));
}

#[test]
fn test_failed_decode_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.xml");

    let out = psictl(&["-d", "-o", dest.to_str().unwrap()], b"definitely not a container");
    assert!(!out.status.success());
    assert!(!dest.exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");

    let out = psictl(&["-e", "-i", missing.to_str().unwrap()], b"");
    assert!(!out.status.success());
}

#[test]
fn test_mode_required() {
    let out = psictl(&[], b"");
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_help_flag() {
    let out = psictl(&["-h"], b"");
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("PSI Encoder & Decoder"));
    assert!(stdout.contains("--decode"));
    assert!(stdout.contains("--encode"));
}
