extern crate ippcode23_parser;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process;

use clap::{App, Arg};
use log::info;

use ippcode23_parser::{LeniencyLevel, Translator};
use ippcode23_parser::lines;

fn main() {
    env_logger::init();

    let matches = App::new("check_ippcode23")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reports the first error in each IPPcode23 source file.")
        .arg(Arg::with_name("FILES")
            .required(true)
            .multiple(true))
        .arg(Arg::with_name("strict")
            .long("strict")
            .help("Accepts only decimal int literals."))
        .arg(Arg::with_name("plain")
            .long("plain")
            .help("Disables colored output."))
        .get_matches();

    let leniency = if matches.is_present("strict") { LeniencyLevel::Strict } else { LeniencyLevel::Lenient };
    let translator = Translator::new(leniency);
    let color = !matches.is_present("plain");

    let mut failed = false;
    for arg in matches.values_of("FILES").into_iter().flatten() {
        let path = Path::new(arg);
        let source = match File::open(path).and_then(|file| lines::read_lines(BufReader::new(file))) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                eprintln!("{}: not valid UTF-8", path.display());
                failed = true;
                continue;
            }
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed = true;
                continue;
            }
        };

        match translator.translate(&source) {
            Ok(program) => {
                info!("{}: {} instructions", path.display(), program.len());
                println!("{}: found no errors", path.display());
            }
            Err(error) => {
                println!("{}", error.render(Some(arg), color));
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
