#![ allow( clippy::unwrap_used ) ]
#![ allow( clippy::expect_used ) ]

use assert_fs::TempDir;
use assert_fs::prelude::*;

use std::io::Write;
use std::process::Command;
use std::process::Stdio;

fn make_main_program() -> Command {
    let exe = std::env!( "CARGO_BIN_EXE_picfind" );
    #[ allow( unused_mut ) ]
    let mut cmd = std::process::Command::new( exe );
    // cmd.env( "RUST_LOG", "trace" );
    cmd
}

macro_rules! make_tempdir {
    () => { {
        TempDir::new().expect( "Failed to setup tempdir" )
    } };
}

#[ test ]
fn count_and_last_find_on_stdout() {
    let top = make_tempdir!();
    top.child( "a.jpg" ).touch().unwrap();
    top.child( "sub/b.PNG" ).touch().unwrap();
    top.child( "sub/c.txt" ).touch().unwrap();

    let res = make_main_program()
        .arg( "--no-open" )
        .arg( top.path() )
        .output().unwrap()
    ;

    assert!( res.status.success() );

    let stdout = String::from_utf8_lossy( &res.stdout );
    assert!( stdout.contains( "Found 2 image(s)" ) );
    assert!( stdout.contains( "Last found image:" ) );
}

#[ test ]
fn directory_asked_over_stdin() {
    let top = make_tempdir!();
    top.child( "pic.bmp" ).touch().unwrap();

    let mut child = make_main_program()
        .arg( "--no-open" )
        .stdin( Stdio::piped() )
        .stdout( Stdio::piped() )
        .spawn().unwrap()
    ;

    child.stdin.as_mut().unwrap()
        .write_all( format!( "{}\n", top.path().display() ).as_bytes() )
        .unwrap();

    let res = child.wait_with_output().unwrap();

    assert!( res.status.success() );

    let stdout = String::from_utf8_lossy( &res.stdout );
    assert!( stdout.contains( "Enter the directory to scan:" ) );
    assert!( stdout.contains( "Found 1 image(s)" ) );
}

#[ test ]
fn invalid_directory_fails() {
    let top = make_tempdir!();
    let plain = top.child( "plain.txt" );
    plain.touch().unwrap();

    let res = make_main_program()
        .arg( "--no-open" )
        .arg( plain.path() )
        .output().unwrap()
    ;

    assert!( !res.status.success() );
    assert!( String::from_utf8_lossy( &res.stderr )
        .contains( "is not a valid directory" )
    );
}

#[ test ]
fn empty_tree_reports_zero() {
    let top = make_tempdir!();

    let res = make_main_program()
        .arg( "--no-open" )
        .arg( top.path() )
        .output().unwrap()
    ;

    assert!( res.status.success() );

    let stdout = String::from_utf8_lossy( &res.stdout );
    assert!( stdout.contains( "Found 0 image(s)" ) );
    assert!( !stdout.contains( "Last found image:" ) );
}
