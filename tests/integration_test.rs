use std::env;
use std::io::Write;
use std::process::{Command, Stdio};
use std::str;

use tempfile::tempdir;

fn spawn_minidb(db_path: &str, input: &[&str]) -> Vec<String> {
    let mut process = minidb_exe()
        .arg(db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("unable to start minidb");

    let stdin = process.stdin.as_mut().expect("unable to pipe stdin");
    for line in input {
        stdin
            .write_all(format!("{line}\n").as_bytes())
            .unwrap_or_else(|_| panic!("unable to write command `{line}`"));
    }

    let output = process
        .wait_with_output()
        .expect("unable to collect process output");

    str::from_utf8(&output.stdout)
        .expect("stdout was not valid utf8")
        .lines()
        .map(str::to_owned)
        .collect()
}

fn minidb_exe() -> Command {
    let target_dir = env::current_exe()
        .ok()
        .map(|mut path| {
            path.pop();
            if path.ends_with("deps") {
                path.pop();
            }
            path
        })
        .expect("could not resolve current exe directory");
    let bin = target_dir.join(format!("minidb{}", env::consts::EXE_SUFFIX));
    Command::new(bin)
}

#[test]
fn persistence_round_trip() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let output = spawn_minidb(
        &db_path,
        &["insert 1 user1 person1@example.com", ".exit"],
    );
    assert_eq!(output, vec!["db > Executed.".to_owned(), "db > ".to_owned()]);

    let output = spawn_minidb(&db_path, &["select", ".exit"]);
    assert_eq!(
        output,
        vec![
            "db > (1, user1, person1@example.com)".to_owned(),
            "Executed.".to_owned(),
            "db > ".to_owned(),
        ]
    );
}

#[test]
fn duplicate_rejection() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let output = spawn_minidb(
        &db_path,
        &["insert 1 a a@a", "insert 1 b b@b", "select", ".exit"],
    );

    assert_eq!(
        output,
        vec![
            "db > Executed.".to_owned(),
            "db > Error: Duplicate key.".to_owned(),
            "db > (1, a, a@a)".to_owned(),
            "Executed.".to_owned(),
            "db > ".to_owned(),
        ]
    );
}

#[test]
fn ordering_under_out_of_order_insertion() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let output = spawn_minidb(
        &db_path,
        &[
            "insert 3 three three@example.com",
            "insert 1 one one@example.com",
            "insert 2 two two@example.com",
            "select",
            ".exit",
        ],
    );

    assert_eq!(
        output,
        vec![
            "db > Executed.".to_owned(),
            "db > Executed.".to_owned(),
            "db > Executed.".to_owned(),
            "db > (1, one, one@example.com)".to_owned(),
            "(2, two, two@example.com)".to_owned(),
            "(3, three, three@example.com)".to_owned(),
            "Executed.".to_owned(),
            "db > ".to_owned(),
        ]
    );
}

#[test]
fn field_length_rejection() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let username = "a".repeat(33);
    let output = spawn_minidb(
        &db_path,
        &[&format!("insert 1 {username} person@example.com"), "select", ".exit"],
    );

    assert_eq!(
        output,
        vec![
            "db > String is too long.".to_owned(),
            "db > Executed.".to_owned(),
            "db > ".to_owned(),
        ]
    );
}

#[test]
fn negative_id_is_rejected() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let output = spawn_minidb(&db_path, &["insert -1 foo bar@baz.com", ".exit"]);

    assert_eq!(
        output,
        vec!["db > ID must be positive.".to_owned(), "db > ".to_owned()]
    );
}

#[test]
fn leaf_split_produces_height_two_tree() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let mut commands: Vec<String> = (1..=14)
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    commands.push(".btree".to_owned());
    commands.push("select".to_owned());
    commands.push(".exit".to_owned());
    let commands: Vec<&str> = commands.iter().map(String::as_str).collect();

    let output = spawn_minidb(&db_path, &commands);

    let btree_start = output
        .iter()
        .position(|l| l.ends_with("Tree:"))
        .expect("Tree: header missing");
    assert_eq!(output[btree_start + 1], "- internal (size 1)");

    let select_rows = output.iter().filter(|l| l.starts_with('(')).count();
    assert_eq!(select_rows, 14);
}

#[test]
fn fatal_on_internal_split_exits_nonzero() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let mut commands: Vec<String> = (1..=21)
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    commands.push(".exit".to_owned());

    let mut process = minidb_exe()
        .arg(&db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("unable to start minidb");

    {
        let stdin = process.stdin.as_mut().unwrap();
        for line in &commands {
            let _ = stdin.write_all(format!("{line}\n").as_bytes());
        }
    }

    let output = process.wait_with_output().expect("unable to wait");
    assert!(!output.status.success());

    let stderr = str::from_utf8(&output.stderr).unwrap();
    assert!(stderr.contains("Need to implement updating parent after split"));
}

#[test]
fn fresh_file_selects_no_rows() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db1").to_str().unwrap().to_owned();

    let output = spawn_minidb(&db_path, &["select", ".exit"]);

    assert_eq!(
        output,
        vec!["db > Executed.".to_owned(), "db > ".to_owned()]
    );
}

#[test]
fn missing_filename_argument_is_rejected() {
    let output = minidb_exe().output().expect("unable to run minidb");
    assert!(!output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert_eq!(stdout.trim_end(), "Must supply a database filename.");
}
