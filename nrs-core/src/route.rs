//!
//! Ports and Routes.
//!
//! A route is the sequence of ports a message has to leave through to
//! reach its destination.  On the wire it is a string with one character
//! per hop, each character naming a port in a 64 symbol alphabet.  The
//! sender of a message removes the first hop before writing it, so the
//! route a component receives always starts with the port *it* must use
//! next; an empty route means the message has arrived.
//!

use std::{collections::VecDeque, fmt, str::FromStr};

use crate::error::RouteError;

/// The alphabet of route tokens, indexed by port number.
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// One of a component's ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(u8);

impl PortId {
    /// The largest port number that has a route token.
    pub const MAX: u8 = 63;

    /// Create a port id, failing for ports that cannot appear in a route
    pub fn new(port: u32) -> Result<Self, RouteError> {
        if port > Self::MAX as u32 {
            return Err(RouteError::PortOutOfRange(port));
        }
        Ok(Self(port as u8))
    }

    /// The port number
    pub fn number(&self) -> u8 {
        self.0
    }

    /// The route token of this port
    pub fn token(&self) -> char {
        ALPHABET[self.0 as usize] as char
    }

    /// Parse a single route token
    pub fn from_token(token: char) -> Result<Self, RouteError> {
        ALPHABET
            .iter()
            .position(|c| *c as char == token)
            .map(|idx| Self(idx as u8))
            .ok_or(RouteError::InvalidToken(token))
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sequence of hops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    /// The hops, next hop first
    hops: VecDeque<PortId>,
}

impl Route {
    /// The empty route
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a route from its wire form
    pub fn parse(route: &str) -> Result<Self, RouteError> {
        let hops = route
            .chars()
            .map(PortId::from_token)
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(Self { hops })
    }

    /// Whether there are no hops left
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The number of hops left
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// The next hop without consuming it
    pub fn peek(&self) -> Option<PortId> {
        self.hops.front().copied()
    }

    /// Consume the next hop
    pub fn pop_front(&mut self) -> Option<PortId> {
        self.hops.pop_front()
    }

    /// Record a port in front of the existing hops.
    ///
    /// This is how a return route grows as a request travels: every
    /// component puts the port it received the request on in front, so the
    /// finished route starts with the last component's way back.
    pub fn prepend(&mut self, port: PortId) {
        self.hops.push_front(port);
    }

    /// Append a hop
    pub fn push(&mut self, port: PortId) {
        self.hops.push_back(port);
    }

    /// Iterate over the hops, next hop first
    pub fn iter(&self) -> impl Iterator<Item = PortId> + '_ {
        self.hops.iter().copied()
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in self.hops.iter() {
            write!(f, "{}", hop.token())?;
        }
        Ok(())
    }
}

impl FromIterator<PortId> for Route {
    fn from_iter<T: IntoIterator<Item = PortId>>(iter: T) -> Self {
        Self {
            hops: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::random;

    #[test]
    fn test_port_tokens() {
        for port in 0..=PortId::MAX as u32 {
            let id = PortId::new(port).unwrap();
            assert_eq!(PortId::from_token(id.token()).unwrap(), id);
        }
        assert_eq!(PortId::new(64), Err(RouteError::PortOutOfRange(64)));
        assert_eq!(PortId::from_token('!'), Err(RouteError::InvalidToken('!')));
    }

    #[test]
    fn test_route_parse_and_display() {
        let route = Route::parse("3Az_").unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(route.peek(), Some(PortId::new(3).unwrap()));
        assert_eq!(route.to_string(), "3Az_");
        assert!(Route::parse("").unwrap().is_empty());
        assert_eq!(Route::parse("1 2"), Err(RouteError::InvalidToken(' ')));
    }

    #[test]
    fn test_return_route_retraces_path() {
        // A request crossing three components, each prepending its inbound port.
        let ports: Vec<PortId> = (0..3)
            .map(|_| PortId::new(random::<u32>() % 64).unwrap())
            .collect();
        let mut return_route = Route::new();
        for port in ports.iter() {
            return_route.prepend(*port);
        }

        // The reply leaves the last component first.
        let mut retraced = Vec::new();
        while let Some(hop) = return_route.pop_front() {
            retraced.push(hop);
        }
        let mut expected = ports.clone();
        expected.reverse();
        assert_eq!(retraced, expected);
    }
}
