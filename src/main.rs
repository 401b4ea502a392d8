// Interactive demo: hash a password with bcrypt, then verify it.
//
//   bcrypt_facade              prompt, hash at the default cost, verify
//   bcrypt_facade calibrate N  print the highest cost that hashes within N ms

use std::env;
use std::io::{self, Write};

use bcrypt_facade::{Calibrator, Engine, PasswordHash};
use rpassword::read_password;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let engine = Engine::new();
    let mut args = env::args().skip(1);

    if let Some(command) = args.next() {
        if command != "calibrate" {
            return Err(format!("unknown command: {}", command).into());
        }
        let ceiling: u64 = args
            .next()
            .ok_or("usage: calibrate <milliseconds>")?
            .parse()?;
        let cost = Calibrator::new(&engine).calibrate(ceiling);
        println!("Suggested cost for {} ms: {}", ceiling, cost);
        return Ok(());
    }

    // Read password securely (without displaying it)
    print!("Enter password to hash: ");
    io::stdout().flush()?;
    let password = read_password()?;

    let hashed = PasswordHash::create_default(&engine, &password)?;

    println!("\nHashed password: {}", hashed);
    println!("  version: {}", hashed.version());
    println!("  cost:    {}", hashed.cost());
    println!("  salt:    {}", hashed.salt());
    println!("  digest:  {}", hashed.digest());

    print!("\nEnter password to verify: ");
    io::stdout().flush()?;
    let verify_password = read_password()?;

    let stored = PasswordHash::new(hashed.into_string())?;
    let is_valid = stored.verify(&engine, &verify_password)?;
    println!("\nPassword verification: {}", if is_valid { "success" } else { "failed" });

    Ok(())
}
