use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use rayon::prelude::*;
use tap::Pipe;
use tracing::debug;
use tracing::warn;

use crate::img;

/// Errors that stop a scan before it finds anything.
#[ derive( Debug ) ]
#[ derive( thiserror::Error ) ]
pub enum ScanError {
    #[ error(
        r#""{path}" does not exist or is not a directory"#,
        path = .0.display()
    ) ]
    NotADirectory( PathBuf ),

    #[ error( r#"Failed to list directory "{dir}""#, dir = .path.display() ) ]
    Listing {
        path: PathBuf,
        source: io::Error,
    },
}

/// Recursively collect all images under `toplevel`.
///
/// The toplevel itself must be a listable directory. Further down
/// the tree an unreadable directory only costs its own branch,
/// it is skipped with a warning while the rest of the scan
/// carries on.
#[ tracing::instrument ]
pub fn collect_images( toplevel: &Path )
    -> Result< Vec<PathBuf>, ScanError >
{
    if !toplevel.is_dir() {
        return Err( ScanError::NotADirectory( toplevel.to_owned() ) );
    }
    debug!( "scan toplevel" );
    list_entries( toplevel )?
        .pipe( walk_entries )
        .pipe( Ok )
}

/// One fork of the traversal. Listing failures down here are
/// demoted to warnings.
fn walk( dir: PathBuf ) -> Vec<PathBuf> {
    match list_entries( &dir ) {
        Ok( entries ) => walk_entries( entries ),
        Err( err ) => {
            warn!( "{err}, branch skipped" );
            Vec::new()
        },
    }
}

/// The fork/join core. Sibling subdirectories are scanned
/// concurrently with each other and with the filtering of local
/// files, then their findings are appended after the local ones
/// in listing order.
fn walk_entries( entries: Vec<PathBuf> ) -> Vec<PathBuf> {
    // NOTE: is_dir traverses symlinks, so a symlink loop keeps
    // the scan running forever. Known, accepted.
    let ( subdirs, files ): ( Vec<_>, Vec<_> ) = entries
        .into_iter()
        .partition( |path| path.is_dir() );

    let ( mut images, nested ) = rayon::join(
        || {
            files.into_iter()
                .filter( |path| img::is_image( path ) )
                .collect::< Vec<_> >()
        },
        || {
            subdirs.into_par_iter()
                .map( walk )
                .collect::< Vec<_> >()
        },
    );

    for child in nested {
        images.extend( child );
    }

    images
}

fn list_entries( dir: &Path ) -> Result< Vec<PathBuf>, ScanError > {
    fs::read_dir( dir )
        .and_then( |listing| {
            listing
                .map( |entry| entry.map( |it| it.path() ) )
                .collect::< io::Result< Vec<_> > >()
        } )
        .map_err( |source| ScanError::Listing {
            path: dir.to_owned(),
            source,
        } )
}

#[ cfg( test ) ]
#[ allow( clippy::unwrap_used ) ]
mod tests {

    use super::*;

    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    use std::collections::HashSet;

    macro_rules! make_tempdir {
        () => { {
            TempDir::new().expect( "Failed to setup tempdir" )
        } };
    }

    /// Plain single threaded depth first reference walk,
    /// for comparing against the fork/join one.
    fn walk_sequential( dir: &Path ) -> Vec<PathBuf> {
        let mut images = Vec::new();
        let mut subdirs = Vec::new();
        for entry in fs::read_dir( dir ).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                subdirs.push( path );
            } else if img::is_image( &path ) {
                images.push( path );
            }
        }
        for sub in subdirs {
            images.extend( walk_sequential( &sub ) );
        }
        images
    }

    #[ test ]
    fn images_at_every_depth() {
        let top = make_tempdir!();
        top.child( "a.jpg" ).touch().unwrap();
        top.child( "one/b.png" ).touch().unwrap();
        top.child( "one/two/c.JPEG" ).touch().unwrap();
        top.child( "one/two/three/d.bmp" ).touch().unwrap();
        top.child( "one/two/readme.txt" ).touch().unwrap();

        let found = collect_images( top.path() ).unwrap();
        assert_eq!( found.len(), 4 );

        let found: HashSet<PathBuf> = found.into_iter().collect();
        for name in [
            "a.jpg",
            "one/b.png",
            "one/two/c.JPEG",
            "one/two/three/d.bmp",
        ] {
            assert!( found.contains( top.child( name ).path() ) );
        }
    }

    #[ test ]
    fn empty_directory() {
        let top = make_tempdir!();
        let found = collect_images( top.path() ).unwrap();
        assert!( found.is_empty() );
    }

    #[ test ]
    fn not_a_directory() {
        let top = make_tempdir!();
        let plain = top.child( "plain.txt" );
        plain.touch().unwrap();

        let err = collect_images( plain.path() ).unwrap_err();
        assert!( matches!( err, ScanError::NotADirectory( .. ) ) );

        let err = collect_images( &top.path().join( "nonexist" ) )
            .unwrap_err();
        assert!( matches!( err, ScanError::NotADirectory( .. ) ) );
    }

    #[ test ]
    fn local_images_come_first() {
        let top = make_tempdir!();
        top.child( "local.jpg" ).touch().unwrap();
        top.child( "sub/nested.png" ).touch().unwrap();

        let found = collect_images( top.path() ).unwrap();
        assert_eq!( found.first().unwrap(), top.child( "local.jpg" ).path() );
    }

    #[ test ]
    fn same_set_as_sequential_walk() {
        let top = make_tempdir!();
        for d in 0..8 {
            for f in 0..4 {
                top.child( format!( "d{d}/f{f}.png" ) ).touch().unwrap();
                top.child( format!( "d{d}/deeper/g{f}.jpg" ) )
                    .touch().unwrap();
                top.child( format!( "d{d}/deeper/skip{f}.txt" ) )
                    .touch().unwrap();
            }
        }

        let parallel: HashSet<PathBuf> = collect_images( top.path() )
            .unwrap().into_iter().collect();
        let sequential: HashSet<PathBuf> = walk_sequential( top.path() )
            .into_iter().collect();

        assert_eq!( parallel.len(), 64 );
        assert_eq!( parallel, sequential );
    }

    #[ test ]
    fn last_image_is_one_of_the_matches() {
        let top = make_tempdir!();
        top.child( "a.jpg" ).touch().unwrap();
        top.child( "sub/b.png" ).touch().unwrap();
        top.child( "sub/c.txt" ).touch().unwrap();
        top.child( "sub2" ).create_dir_all().unwrap();

        let found = collect_images( top.path() ).unwrap();
        assert_eq!( found.len(), 2 );

        // No cross sibling ordering is promised, only that the
        // last element is one of the matches.
        let expected: HashSet<PathBuf> = [
            top.child( "a.jpg" ).path().to_owned(),
            top.child( "sub/b.png" ).path().to_owned(),
        ].into();
        assert!( expected.contains( found.last().unwrap() ) );
    }

    #[ cfg( unix ) ]
    #[ test ]
    fn unreadable_subdir_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let top = make_tempdir!();
        top.child( "fine/a.jpg" ).touch().unwrap();
        top.child( "locked/hidden.png" ).touch().unwrap();

        let locked = top.child( "locked" );
        fs::set_permissions(
            locked.path(),
            fs::Permissions::from_mode( 0o000 )
        ).unwrap();

        // Root ignores permission bits, nothing to test there.
        if fs::read_dir( locked.path() ).is_ok() {
            return;
        }

        let found = collect_images( top.path() ).unwrap();
        assert_eq!( found.len(), 1 );
        assert_eq!(
            found.first().unwrap(),
            top.child( "fine/a.jpg" ).path()
        );

        // Restore so the tempdir can clean itself up.
        fs::set_permissions(
            locked.path(),
            fs::Permissions::from_mode( 0o755 )
        ).unwrap();
    }
}
