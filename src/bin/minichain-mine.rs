#![forbid(unsafe_code)]
//! Standalone proof search for client-submitted mining
//!
//! Fetch `previous_hash` from a node's `/mining/context`, search here, then
//! submit the proof to `/mine`.

use clap::Parser;
use minichain::crypto::sha256_hex;
use minichain::miner::{search_proof, MAX_DIFFICULTY};
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "minichain-mine", version, about = "Search for a proof of work")]
struct Args {
    /// Context to mine against: the previous block's hash in client mode
    context: String,

    /// Required leading zero hex digits
    #[arg(short, long, default_value_t = 4)]
    difficulty: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.difficulty > MAX_DIFFICULTY {
        return Err(format!("difficulty must be at most {}", MAX_DIFFICULTY).into());
    }

    println!("Mining against {} at difficulty {}...", args.context, args.difficulty);

    let start = Instant::now();
    let proof = search_proof(&args.context, args.difficulty);
    let elapsed = start.elapsed();

    let digest = sha256_hex(format!("{}{}", args.context, proof).as_bytes());
    println!("Proof:       {}", proof);
    println!("Digest:      {}", digest);
    println!("Mining time: {:.3} seconds", elapsed.as_secs_f64());
    Ok(())
}
