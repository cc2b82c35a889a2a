// State-machine movement macros shared by the request and response
// drivers and by the header-value sub-parsers.
//
// The outer driver is a `loop { match self.state { .. } }`; `mv!`
// advances one byte, switching state first so that exhausting the
// buffer suspends with the destination state recorded. `jmp!` switches
// state without consuming. The `i_*` variants are the interior
// (sub-parser) counterparts operating on `Parser::inner`.

macro_rules! mv {
    ($self:ident, $buf:ident, $p:ident, $st:expr) => {{
        $self.state = $st;
        $p += 1;
        if $p >= $buf.len() {
            return $self.postpone($buf);
        }
        continue;
    }};
}

macro_rules! mv_n {
    ($self:ident, $buf:ident, $p:ident, $n:expr, $st:expr) => {{
        $self.state = $st;
        $p += $n;
        if $p >= $buf.len() {
            return $self.postpone($buf);
        }
        continue;
    }};
}

macro_rules! jmp {
    ($self:ident, $st:expr) => {{
        $self.state = $st;
        continue;
    }};
}

macro_rules! i_enter {
    ($parser:expr, $buf:ident, $i:ident, $st:expr) => {{
        $parser.inner = $st;
        if $i >= $buf.len() {
            return Ok(crate::proto::h1::field::Field::Postpone);
        }
        continue;
    }};
}

macro_rules! i_move {
    ($parser:expr, $buf:ident, $i:ident, $st:expr) => {{
        $i += 1;
        i_enter!($parser, $buf, $i, $st)
    }};
}

macro_rules! i_jmp {
    ($parser:expr, $st:expr) => {{
        $parser.inner = $st;
        continue;
    }};
}

// Entered on the empty line ending the headers: chunked transfer wins
// over Content-Length (RFC 7230 3.3.3); no framing at all means the
// message ends right here.
macro_rules! init_body {
    ($self:ident, $buf:ident, $p:ident, $body_st:expr) => {{
        $self.parser.body_started = true;
        if $self.parser.chunked {
            mv!($self, $buf, $p, $body_st);
        }
        if $self.content_length > 0 {
            $self.parser.to_read = $self.content_length;
            mv!($self, $buf, $p, $body_st);
        }
        return $self.pass($p + 1);
    }};
}

// Resumable literal lookup: on a full match the token is consumed and
// `$then` runs; a boundary inside the literal stores the seen prefix in
// the carry and postpones; a mismatch falls through to the next
// alternative with the carry intact.
macro_rules! try_str {
    ($parser:expr, $buf:ident, $i:ident, $lit:expr, $then:block) => {
        match crate::proto::h1::scan::literal(&mut $parser.carry, $buf, $i, $lit, true)? {
            crate::proto::h1::scan::Lit::Match(__n) => {
                $i += __n;
                $then
            }
            crate::proto::h1::scan::Lit::Postpone => {
                return Ok(crate::proto::h1::field::Field::Postpone);
            }
            crate::proto::h1::scan::Lit::Miss => {}
        }
    };
}

// Driver glue for a recognized header's value state: hands the bytes
// after `name ":" OWS` to the value sub-parser, storing the finished
// header line into its table slot, or suspending with both the outer
// and inner state preserved.
macro_rules! hdr_value {
    ($self:ident, $buf:ident, $p:ident, $start:expr, $slot:expr, $next:expr, $kind:expr, $call:expr) => {{
        if $self.parser.inner == crate::proto::h1::parse::Inner::None {
            $self.parser.begin_value($p, $start);
        }
        match $call {
            Ok(crate::proto::h1::field::Field::Done(n)) => {
                let line = $self.parser.close_line($buf);
                $self.headers.close($slot, line);
                $self.state = $next;
                $p += n;
                if $p >= $buf.len() {
                    return $self.postpone($buf);
                }
                continue;
            }
            Ok(crate::proto::h1::field::Field::Postpone) => {
                $self.parser.value_len += $buf.len() - $p;
                return $self.postpone($buf);
            }
            Err(_) => return $self.block($p, $kind),
        }
    }};
}
