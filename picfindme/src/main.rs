mod img;
mod scan;

use anyhow::Context;
use anyhow::Result as AnyResult;
use tracing::debug;

use std::path::PathBuf;

/// Recursively hunt for images under a directory,
/// then open the last find in the default viewer.
#[ derive( clap::Parser, Debug ) ]
#[ command( max_term_width = 76 ) ]
struct CliOpts {
    /// Directory to scan. Asked interactively over stdin
    /// when omitted.
    input: Option<PathBuf>,

    /// Number of scanning threads. 0 means one per CPU.
    #[ arg( long, short = 'J', default_value_t = 0 ) ]
    jobs: usize,

    /// Only report the findings, never open anything.
    #[ arg( long, short = 'N', action ) ]
    no_open: bool,
}

impl CliOpts {
    fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }
}

fn main() {
    init_tracing_subscriber();

    let _ = run().inspect_err( |err| {
        eprintln!( "{err:?}" );
        std::process::exit( 1 )
    } );
}

#[ tracing::instrument( skip_all ) ]
fn run() -> AnyResult<()> {
    let cliopts = {
        debug!( "Parse cliopts" );
        CliOpts::parse()
    };

    debug!( ?cliopts );

    let toplevel = {
        let path = match cliopts.input {
            Some( path ) => path,
            None => ask_directory()?,
        };
        std::path::absolute( path )?
    };

    debug!( ?toplevel );

    anyhow::ensure! {
        toplevel.is_dir(),
        "\"{}\" is not a valid directory", toplevel.display()
    };

    debug!( "build rayon threadpool" );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads( cliopts.jobs )
        .build()
        .context( "Failed to build rayon threadpool" )?;

    let images = pool.install( || scan::collect_images( &toplevel ) )?;

    println!( "Found {} image(s)", images.len() );

    let Some( last ) = images.last() else {
        return Ok(())
    };

    println!( "Last found image: {}", last.display() );

    if cliopts.no_open {
        debug!( "--no-open given, not opening anything" );
        return Ok(())
    }

    debug!( "open in the default viewer" );

    // Not being able to open the picture doesn't invalidate
    // the findings, so no bailing here.
    if let Err( err ) = open::that( last ) {
        eprintln!( "Failed to open \"{}\": {err}", last.display() );
    }

    Ok(())
}

/// The interactive way of picking the start directory,
/// one line over stdin.
fn ask_directory() -> AnyResult<PathBuf> {
    println!( "Enter the directory to scan:" );

    let mut line = String::new();
    std::io::stdin()
        .read_line( &mut line )
        .context( "Failed to read the directory path from stdin" )?;

    let line = line.trim();
    anyhow::ensure!( !line.is_empty(), "No directory given" );

    Ok( PathBuf::from( line ) )
}

/// Init tracing_subscriber with a fmt layer on stderr
/// plus an env filter.
fn init_tracing_subscriber() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::filter::*;

    use tracing_subscriber::{
        fmt,
        registry
    };

    use std::io::IsTerminal;

    let output = std::io::stderr;

    let fmt_layer = fmt::layer()
        .with_writer( output )
        .with_ansi( output().is_terminal() )
    ;

    let env_layer = EnvFilter::builder()
        .with_default_directive( LevelFilter::INFO.into() )
        .from_env_lossy()
    ;

    registry()
        .with( fmt_layer )
        .with( env_layer )
        .init()
}
