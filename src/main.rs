use clap::Parser;
use midikeyrs::{
    cli::{format_device_list, Args},
    config::Settings,
    create_scheduler,
    error::probe_hint,
    event_loop::EventLoop,
    logging,
    midi::{MidiBackend, MidirBackend},
    HandlerError, InputQueue, MidiInputHandler, Scheduler,
};
use std::sync::Arc;
use std::{thread, time::Duration};

const DRAIN_INTERVAL: Duration = Duration::from_millis(10);

fn main() {
    let args = parse_command_line_arguments();
    let settings = load_settings(&args);
    initialize_logging(&args, &settings);

    let backend = Arc::new(MidirBackend::new(settings.client_name.clone()));

    if args.list_devices {
        list_available_devices(backend.as_ref());
        return;
    }

    let scheduler = create_scheduler();
    let handler = MidiInputHandler::new(backend, scheduler.clone(), settings.handler_options());
    if !handler.initialize() {
        eprintln!("{}", probe_hint());
        std::process::exit(1);
    }

    let queue = Arc::clone(handler.queue());
    scheduler.spawn(move || run_event_loop(queue));

    run_application_loop();
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn load_settings(args: &Args) -> Settings {
    let settings = Settings::load(args.config.as_deref()).and_then(|mut settings| {
        settings.apply_args(args)?;
        Ok(settings)
    });

    match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    }
}

fn initialize_logging(args: &Args, settings: &Settings) {
    let result = if args.log_stderr {
        logging::init_stderr_logger(settings.log_level)
    } else {
        logging::init_logger(settings.log_level).map(|path| {
            eprintln!("Logging to {}", path.display());
        })
    };

    if let Err(e) = result {
        eprintln!("Logger initialization failed: {}", e);
        std::process::exit(1);
    }
    log::info!("Application starting");
}

fn list_available_devices(backend: &dyn MidiBackend) {
    match backend.list_inputs() {
        Ok(ports) => {
            println!("Available MIDI input devices:");
            for line in format_device_list(&ports) {
                println!("{}", line);
            }
        }
        Err(source) => {
            let error = HandlerError::initialization(source);
            log::error!("{}", error);
            eprintln!("{}", error);
            std::process::exit(1);
        }
    }
}

fn run_event_loop(queue: Arc<InputQueue>) {
    // Never signalled; the process ends on Ctrl+C
    let (_shutdown_tx, shutdown_rx) = crossbeam::channel::bounded::<()>(0);
    let mut event_loop = EventLoop::new(queue);
    event_loop.run(shutdown_rx, DRAIN_INTERVAL);
}

fn run_application_loop() {
    log::info!("Application running. Press Ctrl+C to exit...");
    println!("\nListening for MIDI input. Press Ctrl+C to exit...");
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
