use anyhow::Result;

fn main() -> Result<()> {
    let doc = rolegate::api::openapi();
    println!("{}", doc.to_pretty_json()?);
    Ok(())
}
