#![warn(unused_extern_crates)]

use gpu_memory_filter::cli;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let res = cli().await;

    match res {
        Ok(_) => (),
        Err(e) => {
            eprintln!("{}", e.to_string());
            std::process::exit(1);
        }
    }
}
