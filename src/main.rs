//! itmo-qa CLI 진입점

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // CLI 파싱 (로깅은 명령별로 초기화)
    let cli = itmo_qa::cli::Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(itmo_qa::cli::run(cli))
}
