use log::LevelFilter;

const NOISY_TARGETS: [&str; 6] = ["wgpu", "naga", "iced", "cosmic_text", "reqwest", "hyper"];

pub fn setup(is_debug: bool) -> Result<(), fern::InitError> {
    let level = if is_debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_path = data::data_path(Some(data::LOG_FILE_PATH));
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level);

    for target in NOISY_TARGETS {
        dispatch = dispatch.level_for(target, LevelFilter::Warn);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(fern::log_file(log_path)?)
        .apply()?;

    Ok(())
}
