use eyre::Result;

pub fn run(value: &str) -> Result<()> {
    println!("{}", fbcapi::hash_identifier(value));
    Ok(())
}
