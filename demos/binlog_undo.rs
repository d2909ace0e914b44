use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} /path/to/binlog/file /path/to/output/file", args[0]);
        std::process::exit(2);
    }

    let mut output = File::create(&args[2])?;
    binlog_undo::undo_file(&args[1], &mut output)?;
    Ok(())
}
