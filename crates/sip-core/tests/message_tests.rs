use sipbridge_sip_core::prelude::*;

const SDP: &str = "v=0\r\n\
o=- 961825727 961825727 IN IP4 192.168.9.186\r\n\
s=Asterisk\r\n\
c=IN IP4 192.168.9.186\r\n\
t=0 0\r\n\
m=audio 10558 RTP/AVP 0 8 101\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=rtpmap:8 PCMA/8000\r\n\
a=rtpmap:101 telephone-event/8000\r\n\
a=sendrecv\r\n";

fn invite_bytes() -> Vec<u8> {
    format!(
        "INVITE sip:6363@192.168.4.169:48273;rinstance=a73836e86ca6411f SIP/2.0\r\n\
Via: SIP/2.0/UDP 192.168.9.186:5060;rport;branch=z9hG4bKPjc04b36f9-2b54-4620-9693-cb7674e6954c\r\n\
From: \"15625229038\" <sip:15625229038@192.168.9.186>;tag=73ddb69f-1471-454c-876f-a732b88f96fb\r\n\
To: <sip:6363@192.168.4.169;rinstance=a73836e86ca6411f>\r\n\
Contact: <sip:asterisk@192.168.9.186:5060>\r\n\
Call-ID: 91182449-1b4a-4488-a9ae-d150a2271cb8\r\n\
CSeq: 7286 INVITE\r\n\
Allow: OPTIONS, SUBSCRIBE, NOTIFY, PUBLISH, INVITE, ACK, BYE, CANCEL, UPDATE, PRACK, REGISTER, REFER, MESSAGE\r\n\
Supported: 100rel, timer, replaces, norefersub\r\n\
Session-Expires: 1800\r\n\
Min-SE: 90\r\n\
Max-Forwards: 70\r\n\
User-Agent: FPBX-13.0.192.8(13.27.0)\r\n\
Content-Type: application/sdp\r\n\
Content-Length:   {}\r\n\
\r\n\
{}",
        SDP.len(),
        SDP
    )
    .into_bytes()
}

const TRYING: &[u8] = b"SIP/2.0 100 Trying\r\n\
Via: SIP/2.0/UDP 192.168.4.169:5060;branch=z9hG4bK-524287-1---c34e1fe4153b4900\r\n\
From: <sip:1001@192.168.9.185:5060;transport=UDP>;tag=dd669b44\r\n\
To: <sip:15625229038@192.168.9.185:5060;transport=UDP>\r\n\
Call-ID: 42VFkMGXZKZJ9Bz5Jfs3GQ..\r\n\
CSeq: 2 INVITE\r\n\
User-Agent: FreeSWITCH-mod_sofia/1.8.6~64bit\r\n\
Content-Length: 0\r\n\r\n";

#[test]
fn test_decode_invite() {
    let registry = HeaderParserRegistry::default();
    let mut request = parse_request(&invite_bytes(), &registry).unwrap();

    assert_eq!(request.method, Method::Invite);
    assert_eq!(request.uri.user.as_deref(), Some("6363"));
    assert_eq!(request.uri.port, Some(48273));
    assert_eq!(request.uri.param("rinstance"), Some("a73836e86ca6411f"));
    assert_eq!(request.call_id(), "91182449-1b4a-4488-a9ae-d150a2271cb8");

    let via = request.headers.via().unwrap();
    assert_eq!(via.transport, "UDP");
    assert_eq!(via.rport(), Some(None));

    let from = request.headers.address(HeaderName::FROM).unwrap();
    assert_eq!(from.display_name.as_deref(), Some("15625229038"));
    assert_eq!(from.tag(), Some("73ddb69f-1471-454c-876f-a732b88f96fb"));

    assert_eq!(request.headers.cseq(), Some(&CSeq::new(7286, Method::Invite)));
    assert_eq!(request.headers.max_forwards(), Some(70));
    assert_eq!(request.headers.get("Allow").and_then(HeaderValue::as_list).map(|l| l.len()), Some(13));
    assert_eq!(request.headers.get("Min-SE").and_then(HeaderValue::as_text), Some("90"));
    assert_eq!(&request.body[..], SDP.as_bytes());
}

#[test]
fn test_decode_trying() {
    let registry = HeaderParserRegistry::default();
    let response = parse_response(TRYING, &registry).unwrap();
    assert_eq!(response.status, StatusCode::TRYING);
    assert_eq!(response.reason, "Trying");
    assert_eq!(response.call_id(), "42VFkMGXZKZJ9Bz5Jfs3GQ..");
    let to = response.headers.address("t").unwrap();
    assert_eq!(to.uri.param("transport"), Some("UDP"));
    assert!(response.body.is_empty());
}

#[test]
fn test_reencode_preserves_header_order() {
    let registry = HeaderParserRegistry::default();
    let request = parse_request(&invite_bytes(), &registry).unwrap();
    let wire = request.to_bytes();
    let text = std::str::from_utf8(&wire).unwrap();

    let names: Vec<&str> = text
        .split("\r\n")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split(':').next())
        .collect();
    assert_eq!(names.first(), Some(&"Via"));
    assert_eq!(names.last(), Some(&"Content-Length"));
    assert!(text.contains(&format!("Content-Length: {}\r\n\r\n", SDP.len())));

    let again = parse_request(&wire, &registry).unwrap();
    assert_eq!(again.headers, request.headers);
    assert_eq!(again.body, request.body);
}

#[test]
fn test_compact_headers_decode_to_full_names() {
    let registry = HeaderParserRegistry::default();
    let data = b"OPTIONS sip:a.com SIP/2.0\r\n\
v: SIP/2.0/UDP 10.0.0.1:5060;branch=z9hG4bK1\r\n\
f: <sip:alice@a.com>;tag=1\r\n\
t: <sip:bob@a.com>\r\n\
i: compact-1\r\n\
l: 0\r\n\r\n";
    let mut request = parse_request(data, &registry).unwrap();
    assert!(request.headers.via().is_some());
    assert_eq!(request.call_id(), "compact-1");
    assert!(std::str::from_utf8(&request.to_bytes()).unwrap().contains("Call-ID: compact-1\r\n"));
}

#[test]
fn test_unparsable_typed_header_is_kept_as_text() {
    let registry = HeaderParserRegistry::default();
    let data = b"REGISTER sip:a.com SIP/2.0\r\nContact: *\r\nCSeq: nonsense\r\n\r\n";
    let request = parse_request(data, &registry).unwrap();
    assert_eq!(request.headers.get("Contact"), Some(&HeaderValue::text("*")));
    assert_eq!(request.headers.get("CSeq"), Some(&HeaderValue::text("nonsense")));
}

#[test]
fn test_request_and_response_classification() {
    let registry = HeaderParserRegistry::default();
    assert!(parse_message(TRYING, &registry).unwrap().is_response());
    assert!(parse_message(&invite_bytes(), &registry).unwrap().is_request());
    assert!(parse_response(&invite_bytes(), &registry).is_err());
}

#[test]
fn test_authorization_with_multibyte_whitespace() {
    let registry = HeaderParserRegistry::default();
    let data = "REGISTER sip:a.com SIP/2.0\r\n\
Call-ID: x\r\n\
Authorization: Digest\u{3000}realm=\"a.com\"\r\n\
Content-Length: 0\r\n\r\n";
    let message = parse_message(data.as_bytes(), &registry).unwrap();
    let Message::Request(request) = message else {
        panic!("expected a request");
    };
    let creds = request.headers.get("Authorization").and_then(|v| v.as_credentials()).unwrap();
    assert_eq!(creds.scheme, "Digest");
    assert_eq!(creds.realm.as_deref(), Some("a.com"));
}
