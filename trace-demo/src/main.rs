mod trace_reader;

use std::env;
use std::process::ExitCode;

use rand::Rng;

use vmsim::mmu::{Access, Mmu, MmuConfig, Summary};
use vmsim::page_replacer::Policy;

/// The textbook reference string used when no trace file is given.
const CLASSIC_REF_STRING: [usize; 20] = [7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2, 1, 2, 0, 1, 7, 0, 1];

const DEFAULT_FRAME_COUNT: usize = 3;
const DEFAULT_PAGE_SIZE: usize = 4096;

const USAGE: &str = "usage: trace-demo [options] [trace-file]

Runs a page-replacement simulation over a reference sequence. With no
trace file, uses the classic 20-reference textbook string.

options:
    --frames N       physical frame count (default 3)
    --pages N        page table size (default: highest page + 1)
    --page-size N    bytes per page for trace files (default 4096)
    --policy NAME    fifo | lru | opt | hpra | all (default all)
    --random N       simulate N random references instead of a trace
    --trace          print every reference as it is handled";

struct Options {
    frame_count: usize,
    max_pages: Option<usize>,
    page_size: usize,
    policy: Option<Policy>,
    random: Option<usize>,
    trace: bool,
    trace_file: Option<String>,
}

fn parse_args(mut args: env::Args) -> Result<Options, String> {
    let mut options = Options {
        frame_count: DEFAULT_FRAME_COUNT,
        max_pages: None,
        page_size: DEFAULT_PAGE_SIZE,
        policy: None,
        random: None,
        trace: false,
        trace_file: None,
    };

    args.next(); // program name

    fn numeric(name: &str, args: &mut env::Args) -> Result<usize, String> {
        args.next()
            .ok_or_else(|| format!("{} expects a value", name))?
            .parse::<usize>()
            .map_err(|e| format!("bad value for {}: {}", name, e))
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frames" => options.frame_count = numeric("--frames", &mut args)?,
            "--pages" => options.max_pages = Some(numeric("--pages", &mut args)?),
            "--page-size" => options.page_size = numeric("--page-size", &mut args)?,
            "--random" => options.random = Some(numeric("--random", &mut args)?),
            "--policy" => {
                let name = args.next().ok_or("--policy expects a value")?;
                if name.eq_ignore_ascii_case("all") {
                    options.policy = None;
                } else {
                    options.policy = Some(name.parse().map_err(|e| format!("{}", e))?);
                }
            }
            "--trace" => options.trace = true,
            "--help" | "-h" => return Err(String::new()),
            _ if arg.starts_with('-') => return Err(format!("unknown option {}", arg)),
            _ => options.trace_file = Some(arg),
        }
    }

    if options.page_size == 0 {
        return Err("--page-size must be positive".to_string());
    }

    Ok(options)
}

fn reference_sequence(options: &Options) -> Result<Vec<usize>, String> {
    if let Some(path) = &options.trace_file {
        return trace_reader::read_trace(path, options.page_size)
            .map_err(|e| format!("cannot read trace {}: {}", path, e));
    }
    if let Some(len) = options.random {
        let max_pages = options.max_pages.unwrap_or(CLASSIC_REF_STRING.len());
        let mut rng = rand::thread_rng();
        return Ok((0..len).map(|_| rng.gen_range(0..max_pages)).collect());
    }
    Ok(CLASSIC_REF_STRING.to_vec())
}

fn occupancy_line(frames: &[Option<usize>]) -> String {
    frames
        .iter()
        .map(|f| match f {
            Some(page) => page.to_string(),
            None => "empty".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

fn print_summary(policy: Policy, summary: &Summary) {
    for record in &summary.trace {
        let access = match record.access {
            Access::Hit => "hit",
            Access::Fault => "fault",
        };
        println!(
            "{:>4}  page {:>3}  {:<5}  [{}]",
            record.step,
            record.page,
            access,
            occupancy_line(&record.frames)
        );
    }
    println!("Policy: {}", policy);
    println!("Page faults: {}", summary.faults);
    println!("Page hits: {}", summary.hits);
    println!("Final frames: {}", occupancy_line(&summary.frames));
}

fn simulate(policy: Policy, options: &Options, refs: &[usize]) -> Result<Summary, String> {
    let max_pages = options
        .max_pages
        .unwrap_or_else(|| refs.iter().max().map_or(1, |max| max + 1));

    let mut config = MmuConfig::new(options.frame_count, max_pages, policy);
    if options.trace {
        config = config.with_trace();
    }

    Mmu::new(&config)
        .and_then(|mmu| mmu.run(refs))
        .map_err(|e| format!("{}: {}", policy, e))
}

fn run() -> Result<(), String> {
    let options = parse_args(env::args())?;
    let refs = reference_sequence(&options)?;

    if refs.len() <= 64 {
        println!("References ({}): {:?}", refs.len(), refs);
    } else {
        println!("References: {} page numbers", refs.len());
    }
    println!();

    match options.policy {
        Some(policy) => {
            let summary = simulate(policy, &options, &refs)?;
            print_summary(policy, &summary);
        }
        None => {
            // comparison mode: same input, every policy, one line each
            println!("{:<6}  {:>6}  {:>6}  final frames", "policy", "faults", "hits");
            for policy in Policy::ALL {
                let summary = simulate(policy, &options, &refs)?;
                println!(
                    "{:<6}  {:>6}  {:>6}  [{}]",
                    policy.to_string(),
                    summary.faults,
                    summary.hits,
                    occupancy_line(&summary.frames)
                );
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            if message.is_empty() {
                println!("{}", USAGE);
                ExitCode::SUCCESS
            } else {
                eprintln!("trace-demo: {}", message);
                eprintln!("{}", USAGE);
                ExitCode::FAILURE
            }
        }
    }
}
