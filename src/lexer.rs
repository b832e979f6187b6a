/// Splits one raw input line into word and operator tokens.
///
/// `|`, `<`, `>` and `&` always stand alone; single and double quotes group
/// characters into the surrounding word. No escapes, no expansion.
pub fn tokenize(line: &str) -> Vec<String> {
	let mut tokens: Vec<String> = vec![];
	let mut word = String::new();
	let mut chars = line.chars();
	while let Some(c) = chars.next() {
		match c {
			' ' | '\t' | '\n' => flush(&mut tokens, &mut word),
			'|' | '<' | '>' | '&' => {
				flush(&mut tokens, &mut word);
				tokens.push(c.to_string());
			},
			'\'' | '"' => {
				let quote = c;
				loop {
					match chars.next() {
						Some(d) if d == quote => break,
						Some(d) => word.push(d),
						// unterminated quote: keep what we have
						None => break,
					}
				}
			},
			_ => word.push(c),
		}
	}
	flush(&mut tokens, &mut word);
	tokens
}

fn flush(tokens: &mut Vec<String>, word: &mut String) {
	if !word.is_empty() {
		tokens.push(std::mem::take(word));
	}
}
