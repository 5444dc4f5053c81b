use rhizome_frame::default_registry;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("rhizome {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let versions: Vec<String> = default_registry()
        .versions()
        .into_iter()
        .map(|version| version.to_string())
        .collect();

    println!("name: rhizome");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("protocol_versions: {}", versions.join(","));
    println!(
        "target: {}",
        option_env!("RHIZOME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));

    Ok(SUCCESS)
}
