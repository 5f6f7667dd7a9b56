use std::fs::File;
use std::io;
use std::process;

use clap::{Arg, ArgMatches, Command};
use csv::ReaderBuilder;
use log::info;

use cloudsim::scheduler::{
    DynamicWorkload, Policy, SchedulerConfig, SchedulerCore, SpaceShared, TimeShared, WeightedFair,
};
use cloudsim::{
    simulation, Cloudlet, PolicyKind, Result, SimulationError, SimulationReport, Time,
    UtilizationModel, Workload,
};

/// Reads a cloudlet file and returns a `Workload`
///
/// Each line is `submission_time, length, pes, priority[, cpu_utilization]`.
pub fn read_cloudlet_file(file_path: &str) -> Result<Workload> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file_path)?;
    let mut workload = Workload::new_empty();

    let mut id = 1;

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let line = index + 1;

        if record.len() < 4 {
            return Err(SimulationError::InvalidField {
                line,
                reason: format!("expected at least 4 fields, found {}", record.len()),
            });
        }

        let submission_time: Time = record[0].parse()?;
        let length: u64 = record[1].parse()?;
        let pes: u32 = record[2].parse()?;
        let priority: i32 = record[3].parse()?;

        if submission_time < 0.0 || !submission_time.is_finite() {
            return Err(SimulationError::InvalidField {
                line,
                reason: format!("invalid submission time {}", submission_time),
            });
        }

        let mut cloudlet = Cloudlet::new(id, length, pes).with_priority(priority);
        if let Some(field) = record.get(4) {
            let model = parse_utilization(field).map_err(|reason| SimulationError::InvalidField { line, reason })?;
            cloudlet = cloudlet.with_cpu_utilization(model);
        }

        workload.add(submission_time, cloudlet);
        id += 1;
    }

    Ok(workload)
}

/// Parses `full`, a fraction such as `0.5`, or `dyn:<initial>:<increment>`.
fn parse_utilization(field: &str) -> std::result::Result<UtilizationModel, String> {
    if field.is_empty() || field.eq_ignore_ascii_case("full") {
        return Ok(UtilizationModel::Full);
    }

    if let Some(params) = field.strip_prefix("dyn:") {
        let (initial, increment) = params
            .split_once(':')
            .ok_or_else(|| format!("expected dyn:<initial>:<increment>, found '{}'", field))?;
        let initial = initial.trim().parse::<f64>().map_err(|e| e.to_string())?;
        let increment = increment.trim().parse::<f64>().map_err(|e| e.to_string())?;
        return Ok(UtilizationModel::Dynamic { initial, increment });
    }

    let fraction = field.parse::<f64>().map_err(|e| e.to_string())?;
    if !(0.0..=1.0).contains(&fraction) {
        return Err(format!("utilization {} is not in [0, 1]", fraction));
    }
    Ok(UtilizationModel::Fixed(fraction))
}

/// Parses a comma separated list of per-core MIPS
pub fn parse_mips_share(value: &str) -> Result<Vec<f64>> {
    let share = value
        .split(',')
        .map(|mips| mips.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if share.is_empty() || share.iter().any(|mips| *mips < 0.0 || !mips.is_finite()) {
        return Err(SimulationError::InvalidMipsShare(value.to_string()));
    }

    Ok(share)
}

pub fn build_cli_command() -> Command {
    Command::new("cloudsim")
    .version("1.0")
    .about("Simulates cloudlet scheduling on the cores of a virtual machine")

    .arg(Arg::new("cloudlet_file")
        .required(true)
        .help("Path to the cloudlet file"))

    .arg(Arg::new("mips")
        .short('m')
        .long("mips")
        .required(true)
        .help("MIPS of each core, comma separated (e.g. 1000,1000)"))

    .arg(Arg::new("policy")
        .short('p')
        .long("policy")
        .required(true)
        .help("Scheduling policy")
        .value_parser(["time-shared", "ts", "space-shared", "ss", "dynamic", "dynamic-workload", "fair", "cfs", "weighted-fair"]))

    .arg(Arg::new("latency")
        .long("latency")
        .help("Scheduling latency of the fair policy, in seconds")
        .value_parser(clap::value_parser!(f64))
        .default_value("3.0"))

    .arg(Arg::new("granularity")
        .long("granularity")
        .help("Minimum timeslice of the fair policy, in seconds")
        .value_parser(clap::value_parser!(f64))
        .default_value("2.0"))

    .arg(Arg::new("min_gap")
        .long("min-gap")
        .help("Smallest delay between two scheduler events, in seconds")
        .value_parser(clap::value_parser!(f64))
        .default_value("0.1"))

    .arg(Arg::new("max_time")
        .long("max-time")
        .help("Stop the simulation after this time")
        .value_parser(clap::value_parser!(f64)))

    .arg(Arg::new("output")
        .short('o')
        .long("output")
        .help("Write the finished cloudlets to this CSV file instead of stdout"))
}

fn run_policy<P: Policy>(
    policy: P,
    workload: Workload,
    share: &[f64],
    config: SchedulerConfig,
    max_time: Time,
) -> SimulationReport {
    let mut scheduler = SchedulerCore::with_config(policy, share, config);
    simulation(&mut scheduler, workload, share, max_time)
}

fn run(matches: &ArgMatches) -> Result<SimulationReport> {
    let file_path = matches.get_one::<String>("cloudlet_file").map(String::as_str).unwrap_or_default();
    let workload = read_cloudlet_file(file_path)?;

    let share = parse_mips_share(matches.get_one::<String>("mips").map(String::as_str).unwrap_or_default())?;
    let kind: PolicyKind = matches.get_one::<String>("policy").map(String::as_str).unwrap_or_default().parse()?;
    let config = SchedulerConfig {
        min_time_between_events: matches.get_one::<f64>("min_gap").copied().unwrap_or(0.1),
    };
    let max_time = matches.get_one::<f64>("max_time").copied().unwrap_or(Time::INFINITY);

    info!("{} cloudlets loaded from {}", workload.len(), file_path);

    let report = match kind {
        PolicyKind::TimeShared => run_policy(TimeShared::new(), workload, &share, config, max_time),
        PolicyKind::SpaceShared => run_policy(SpaceShared::new(), workload, &share, config, max_time),
        PolicyKind::DynamicWorkload => {
            let mips = share.iter().copied().fold(0.0, f64::max);
            run_policy(DynamicWorkload::new(mips), workload, &share, config, max_time)
        }
        PolicyKind::WeightedFair => {
            let latency = matches.get_one::<f64>("latency").copied().unwrap_or(3.0);
            let granularity = matches.get_one::<f64>("granularity").copied().unwrap_or(2.0);
            run_policy(WeightedFair::with_params(latency, granularity), workload, &share, config, max_time)
        }
    };

    match matches.get_one::<String>("output") {
        Some(path) => report.write_csv(File::create(path)?)?,
        None => report.write_csv(io::stdout())?,
    }

    Ok(report)
}

fn main() {
    // cargo run <cloudlet_file> -m <mips,...> -p time-shared|space-shared|dynamic|fair [-o <file>]
    // example : cargo run cloudlets.csv -m 1000,1000 -p space-shared
    env_logger::init();
    let matches: ArgMatches = build_cli_command().get_matches();

    let report = match run(&matches) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(5);
        }
    };

    eprintln!(
        "{} finished, {} unfinished, makespan {}",
        report.finished.len(),
        report.unfinished,
        report.makespan
    );

    process::exit(if report.all_finished() { 0 } else { 1 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cloudlet_file_valid() {
        let cloudlet_file_content = "\
            5, 20000, 2, 1\n\
            0, 10000, 1, 0, 0.5\n\
            0, 8000, 1, -1, dyn:0.2:0.1";
        let file_path = "test_cloudlets.csv";

        std::fs::write(file_path, cloudlet_file_content).expect("Unable to write test file");

        let workload = read_cloudlet_file(file_path).expect("Failed to read cloudlet file");
        let arrivals: Vec<_> = workload.iter().collect();

        assert_eq!(workload.len(), 3);
        assert_eq!(workload.next_arrival(), Some(0.0));

        let (time, cloudlet) = arrivals[0];
        assert_eq!(*time, 0.0);
        assert_eq!(cloudlet.id(), 2);
        assert_eq!(cloudlet.length(), 10_000);
        assert_eq!(cloudlet.utilization_of_cpu(0.0), 0.5);

        let (time, cloudlet) = arrivals[2];
        assert_eq!(*time, 5.0);
        assert_eq!(cloudlet.id(), 1);
        assert_eq!(cloudlet.pes(), 2);
        assert_eq!(cloudlet.priority(), 1);

        std::fs::remove_file(file_path).expect("Failed to clean up test file");
    }

    #[test]
    fn test_read_cloudlet_file_invalid_format() {
        let cloudlet_file_content = "Invalid, Data";
        let file_path = "test_invalid_cloudlets.csv";

        std::fs::write(file_path, cloudlet_file_content).expect("Unable to write test file");

        let result = read_cloudlet_file(file_path);
        assert!(matches!(result, Err(SimulationError::InvalidField { line: 1, .. })));

        std::fs::remove_file(file_path).expect("Failed to clean up test file");
    }

    #[test]
    fn test_read_cloudlet_file_bad_utilization() {
        let cloudlet_file_content = "0, 1000, 1, 0, 1.5";
        let file_path = "test_bad_utilization.csv";

        std::fs::write(file_path, cloudlet_file_content).expect("Unable to write test file");

        let result = read_cloudlet_file(file_path);
        assert!(matches!(result, Err(SimulationError::InvalidField { line: 1, .. })));

        std::fs::remove_file(file_path).expect("Failed to clean up test file");
    }

    #[test]
    fn test_parse_mips_share() {
        assert_eq!(parse_mips_share("1000, 500").unwrap(), vec![1000.0, 500.0]);
        assert!(parse_mips_share("1000,fast").is_err());
        assert!(matches!(
            parse_mips_share("1000,-1"),
            Err(SimulationError::InvalidMipsShare(_))
        ));
    }

    #[test]
    fn test_parse_utilization() {
        assert_eq!(parse_utilization("full"), Ok(UtilizationModel::Full));
        assert_eq!(parse_utilization("0.25"), Ok(UtilizationModel::Fixed(0.25)));
        assert_eq!(
            parse_utilization("dyn:0.1:0.05"),
            Ok(UtilizationModel::Dynamic { initial: 0.1, increment: 0.05 })
        );
        assert!(parse_utilization("dyn:0.1").is_err());
    }

    #[test]
    fn test_command_line_arguments() {
        let matches = build_cli_command().try_get_matches_from(vec![
            "cloudsim",
            "cloudlets.csv",
            "-m",
            "1000,1000",
            "-p",
            "fair",
            "--latency",
            "6",
        ]);

        assert!(matches.is_ok());
        let matches = matches.unwrap();

        assert_eq!(
            matches.get_one::<String>("cloudlet_file").unwrap(),
            "cloudlets.csv"
        );
        assert_eq!(
            matches.get_one::<String>("mips").unwrap(),
            "1000,1000"
        );
        assert_eq!(
            matches.get_one::<String>("policy").unwrap(),
            "fair"
        );
        assert_eq!(*matches.get_one::<f64>("latency").unwrap(), 6.0);
        assert_eq!(*matches.get_one::<f64>("granularity").unwrap(), 2.0);
        assert!(matches.get_one::<f64>("max_time").is_none());
    }

    #[test]
    fn test_command_line_rejects_unknown_policy() {
        let matches = build_cli_command().try_get_matches_from(vec![
            "cloudsim",
            "cloudlets.csv",
            "-m",
            "1000",
            "-p",
            "round-robin",
        ]);

        assert!(matches.is_err());
    }
}
