use CstrControl::MpcControl::MpcTask::MpcTask;

use log::error;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

pub fn main() {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("logger initialization failed");

    let mut task = MpcTask::new();
    task.set_problem_name("Van de Vusse CSTR, reference scenario");
    task.set_problem_description(
        "Receding-horizon temperature control with a mid-run feed-temperature step",
    );
    task.pretty_print_task();

    if let Err(e) = task.run() {
        error!("MPC run failed: {}", e);
        std::process::exit(1);
    }

    task.record.pretty_print();
    if let Err(e) = task.record.save_csv("mpc_run.csv") {
        error!("cannot write mpc_run.csv: {}", e);
    }
}
