use std::io::Read;
use std::io::Write;

fn main() {
    let mut src = String::new();
    std::io::stdin()
        .read_to_string(&mut src)
        .expect("failed to read utf-8 input");

    let out = marktree::html::render(&src);
    std::io::stdout()
        .write_all(out.as_bytes())
        .expect("failed to write output");
}
