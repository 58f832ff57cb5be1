// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_trail(steps: usize) -> String {
    let mut xml = String::from("<trail name=\"bench\">\n");
    for step in 0..steps {
        xml.push_str(&format!("<step name=\"s{step}\" type=\"context\">\n<blocks>\n"));
        xml.push_str("<block type=\"title\">Step title</block>\n");
        xml.push_str("<block type=\"text\"><text>Some <b>bold</b> and <i>italic</i> text with a <a href=\"https://example.com\">link</a>.</text></block>\n");
        xml.push_str("<groupblock name=\"more\">\n<block type=\"title\">More</block>\n");
        xml.push_str("<block type=\"text\"><text>Nested content</text></block>\n</groupblock>\n");
        xml.push_str("<block type=\"code\"><code>");
        xml.push_str(&generate_code(3));
        xml.push_str("</code></block>\n");
        xml.push_str("<block type=\"response\"><option type=\"correct\">yes</option><option>no</option></block>\n");
        xml.push_str("</blocks>\n</step>\n");
    }
    xml.push_str("</trail>\n");
    xml
}

#[allow(dead_code)]
pub fn generate_code(functions: usize) -> String {
    let mut code = String::new();
    for i in 0..functions {
        code.push_str(&format!("func f{i}(x: Int) -&gt; Int {{\nif x &gt; 0 {{\nreturn x\n}} else {{\nreturn -x\n}}\n}}\n"));
    }
    code
}
