use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use twocol::{TcVm, TcVmConfig};

fn args() -> ArgMatches {
    Command::new("twocol")
        .about("a lightweight twocol interpreter")
        .version("0.1.0")
        .arg(
            Arg::new("file")
                .index(1)
                .takes_value(true)
                .required(true)
                .help("twocol source file to interpret"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .takes_value(false)
                .required(false)
                .help("prints the final stack, the label table and the run time after execution"),
        )
        .arg(
            Arg::new("trace")
                .short('t')
                .long("trace")
                .takes_value(false)
                .required(false)
                .help("logs every executed instruction together with the stack"),
        )
        .arg(
            Arg::new("ir")
                .short('i')
                .long("ir")
                .takes_value(false)
                .required(false)
                .help("prints the normalized instructions instead of running them"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .takes_value(false)
                .required(false)
                .help("suppresses the output of the twocol program"),
        )
        .get_matches()
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = args();
    let file_name = args.value_of("file").unwrap_or_default();
    let debug = args.is_present("debug");
    let trace = args.is_present("trace");
    let ir = args.is_present("ir");
    let quiet = args.is_present("quiet");

    let default_filter = if trace { "twocol=debug" } else { "twocol=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start = Instant::now();
    let config = TcVmConfig::new(file_name, ir, trace, quiet);
    let mut vm = TcVm::new(config)?;
    if ir {
        return Ok(());
    }

    vm.run()?;
    let elapsed = start.elapsed();
    info!("routine took {} ms", elapsed.as_millis());

    if debug {
        println!("{}", vm.report(elapsed));
    }

    Ok(())
}
