/// Expands `$VAR` and `${VAR}` references against the process
/// environment, leaving unset variables untouched — the Rust rendering
/// of the original's `os.path.expandvars(str(s))`.
pub fn expand_env(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut chars = input.char_indices().peekable();

  while let Some((_, c)) = chars.next() {
    if c != '$' {
      out.push(c);
      continue;
    }

    match chars.peek() {
      Some(&(_, '{')) => {
        chars.next();
        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            closed = true;
            break;
          }
          name.push(c);
        }
        if closed {
          match std::env::var(&name) {
            Ok(val) => out.push_str(&val),
            Err(_) => {
              out.push_str("${");
              out.push_str(&name);
              out.push('}');
            }
          }
        } else {
          out.push_str("${");
          out.push_str(&name);
        }
      }
      Some(&(_, c2)) if c2.is_alphabetic() || c2 == '_' => {
        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
          if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
          } else {
            break;
          }
        }
        match std::env::var(&name) {
          Ok(val) => out.push_str(&val),
          Err(_) => {
            out.push('$');
            out.push_str(&name);
          }
        }
      }
      _ => out.push('$'),
    }
  }

  out
}

pub fn to_lowercase(input: &str) -> String {
  input.to_lowercase()
}
