const WIDTH: usize = 0x10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    address: usize,
    data: &'a [u8],
}

fn printable(chr: u8) -> Option<char> {
    if (0x20..0x7f).contains(&chr) {
        Some(chr as char)
    } else {
        None
    }
}

impl<'a> std::fmt::Display for Line<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04x}", self.address)?;

        for i in 0..WIDTH {
            if i % 8 == 0 {
                write!(f, " ")?;
            }
            if i < self.data.len() {
                write!(f, " {:02x}", self.data[i])?;
            } else {
                write!(f, "   ")?;
            }
        }

        write!(f, "  |")?;

        for b in self.data {
            write!(f, "{}", printable(*b).unwrap_or('.'))?;
        }

        write!(f, "|")
    }
}

#[derive(Debug, Clone)]
pub struct LineIter<'a> {
    data: &'a [u8],
    next: usize,
}

impl<'a> Iterator for LineIter<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next;
        if start >= self.data.len() {
            return None;
        }
        let end = (start + WIDTH).min(self.data.len());
        self.next = end;
        Some(Line {
            address: start,
            data: &self.data[start..end],
        })
    }
}

pub fn hexdump_iter(data: &[u8]) -> LineIter {
    LineIter { data, next: 0 }
}

pub fn hexdump_prefix(prefix: &str, data: &[u8]) {
    for line in hexdump_iter(data) {
        println!("{}{}", prefix, line);
    }
}

pub fn ehexdump_prefix(prefix: &str, data: &[u8]) {
    for line in hexdump_iter(data) {
        eprintln!("{}{}", prefix, line);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lines_chunk_and_format() {
        let data: Vec<u8> = (0..0x14).collect();
        let lines: Vec<String> = hexdump_iter(&data).map(|l| l.to_string()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0000  00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f  \
             |................|"
        );
        assert!(lines[1].starts_with("0010  10 11 12 13"));
    }

    #[test]
    fn ascii_gutter_shows_text() {
        let lines: Vec<String> = hexdump_iter(b"AI2!").map(|l| l.to_string()).collect();
        assert!(lines[0].ends_with("|AI2!|"));
    }
}
