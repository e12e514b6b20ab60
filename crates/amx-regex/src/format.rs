//! Replacement templates
//!
//! Two template syntaxes are supported. The default is ECMAScript's
//! (`$&`, `$1`, `` $` ``, `$'`, `$$`); `MATCH_FORMAT_SED` selects sed's
//! (`&`, `\1`).

/// What a template can refer to for one match.
pub(crate) struct MatchContext<'a> {
    /// Group texts; index 0 is the whole match, unmatched groups are empty.
    pub groups: &'a [&'a [u8]],
    /// Text between the previous match (or the start) and this match.
    pub prefix: &'a [u8],
    /// Text after this match.
    pub suffix: &'a [u8],
}

impl MatchContext<'_> {
    fn group(&self, index: usize) -> &[u8] {
        self.groups.get(index).copied().unwrap_or_default()
    }
}

/// Expand `template` for one match, appending to `out`.
pub(crate) fn expand(template: &[u8], sed: bool, ctx: &MatchContext<'_>, out: &mut Vec<u8>) {
    if sed {
        expand_sed(template, ctx, out);
    } else {
        expand_ecmascript(template, ctx, out);
    }
}

fn expand_ecmascript(template: &[u8], ctx: &MatchContext<'_>, out: &mut Vec<u8>) {
    let mut i = 0;
    while i < template.len() {
        let b = template[i];
        i += 1;
        if b != b'$' {
            out.push(b);
            continue;
        }
        match template.get(i) {
            Some(b'$') => {
                out.push(b'$');
                i += 1;
            }
            Some(b'&') => {
                out.extend_from_slice(ctx.group(0));
                i += 1;
            }
            Some(b'`') => {
                out.extend_from_slice(ctx.prefix);
                i += 1;
            }
            Some(b'\'') => {
                out.extend_from_slice(ctx.suffix);
                i += 1;
            }
            Some(d) if d.is_ascii_digit() => {
                let mut index = usize::from(d - b'0');
                i += 1;
                if let Some(d2) = template.get(i).filter(|d2| d2.is_ascii_digit()) {
                    index = index * 10 + usize::from(d2 - b'0');
                    i += 1;
                }
                out.extend_from_slice(ctx.group(index));
            }
            // Anything else: the `$` is literal and the next byte is read
            // normally.
            _ => out.push(b'$'),
        }
    }
}

fn expand_sed(template: &[u8], ctx: &MatchContext<'_>, out: &mut Vec<u8>) {
    let mut i = 0;
    while i < template.len() {
        let b = template[i];
        i += 1;
        match b {
            b'&' => out.extend_from_slice(ctx.group(0)),
            b'\\' => match template.get(i) {
                Some(d) if d.is_ascii_digit() => {
                    out.extend_from_slice(ctx.group(usize::from(d - b'0')));
                    i += 1;
                }
                Some(&c @ (b'&' | b'\\')) => {
                    out.push(c);
                    i += 1;
                }
                _ => out.push(b'\\'),
            },
            _ => out.push(b),
        }
    }
}
