extern crate ippcode23_parser;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::process;

use clap::{App, Arg, ArgMatches, ErrorKind};
use log::{debug, error};

use ippcode23_parser::{LeniencyLevel, Translator};
use ippcode23_parser::lines;
use ippcode23_parser::stats::{self, Stat, Stats};
use ippcode23_parser::xml::{to_xml, XmlOptions};

const EXIT_PARAMETER: i32 = 10;
const EXIT_INPUT: i32 = 11;
const EXIT_OUTPUT: i32 = 12;

fn app() -> App<'static, 'static> {
    App::new("parse_ippcode23")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Checks IPPcode23 source and writes its XML representation.")
        .arg(Arg::with_name("INPUT")
            .help("Source file to read. Reads standard input if omitted."))
        .arg(Arg::with_name("output")
            .short("o")
            .long("output")
            .value_name("FILE")
            .help("Writes the XML to FILE instead of standard output."))
        .arg(Arg::with_name("strict")
            .long("strict")
            .help("Accepts only decimal int literals."))
        .arg(Arg::with_name("compact")
            .long("compact")
            .help("Writes the XML on one line, without the declaration."))
        .arg(Arg::with_name("stats")
            .long("stats")
            .value_name("FILE")
            .help("Writes the statistics selected with --stat to FILE, one per line."))
        .arg(Arg::with_name("stat")
            .long("stat")
            .value_name("NAME")
            .multiple(true)
            .number_of_values(1)
            .possible_values(&stats::ALL.iter().map(|stat| stat.name()).collect::<Vec<_>>())
            .requires("stats")
            .help("Statistic to report. May be repeated; values are written in the order given."))
}

fn main() {
    env_logger::init();
    process::exit(run(std::env::args_os()));
}

fn run<I, T>(args: I) -> i32
    where I: IntoIterator<Item=T>,
          T: Into<OsString> + Clone
{
    let matches = match app().get_matches_from_safe(args) {
        Ok(matches) => matches,
        Err(e) => {
            return match e.kind {
                ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => {
                    println!("{}", e.message);
                    0
                }
                _ => {
                    eprintln!("{}", e.message);
                    EXIT_PARAMETER
                }
            };
        }
    };

    let origin = matches.value_of("INPUT").unwrap_or("<stdin>");
    let lines = match read_lines(matches.value_of("INPUT")) {
        Ok(lines) => lines,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            error!("couldn't read {}: input is not valid UTF-8", origin);
            return EXIT_INPUT;
        }
        Err(e) => {
            error!("couldn't read {}: {}", origin, e);
            return EXIT_INPUT;
        }
    };

    let leniency = if matches.is_present("strict") { LeniencyLevel::Strict } else { LeniencyLevel::Lenient };
    let program = match Translator::new(leniency).translate(&lines) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e.render(Some(origin), use_color()));
            return e.exit_code();
        }
    };
    debug!("translated {} instructions from {}", program.len(), origin);

    let options = if matches.is_present("compact") {
        XmlOptions { declaration: false, indent: None }
    } else {
        XmlOptions::default()
    };
    let xml = to_xml(&program, &options);

    // Statistics first, so a failure there leaves no XML behind.
    if let Err(e) = write_stats(&matches, &Stats::collect(&program)) {
        error!("couldn't write statistics: {}", e);
        return EXIT_OUTPUT;
    }

    if let Err(e) = write_output(matches.value_of("output"), &xml) {
        error!("couldn't write output: {}", e);
        return EXIT_OUTPUT;
    }

    0
}

fn read_lines(path: Option<&str>) -> io::Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    lines::read_lines(reader)
}

fn write_output(path: Option<&str>, xml: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, xml),
        None => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            stdout.write_all(xml.as_bytes())?;
            stdout.flush()
        }
    }
}

fn write_stats(matches: &ArgMatches, stats: &Stats) -> io::Result<()> {
    let path = match matches.value_of("stats") {
        Some(path) => path,
        None => return Ok(()),
    };
    fs::write(path, stats.report(&selected_stats(matches)))
}

fn selected_stats(matches: &ArgMatches) -> Vec<Stat> {
    // possible_values already rejected anything that doesn't parse.
    matches.values_of("stat")
        .map(|values| values.filter_map(|value| value.parse::<Stat>().ok()).collect())
        .unwrap_or_default()
}

// No color for dumb terminals or when NO_COLOR is set.
fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").map_or(false, |term| term != "dumb")
}
