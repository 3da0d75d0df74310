use std::net::SocketAddr;
use std::time::Duration;

use sipbridge_relay_core::prelude::*;
use sipbridge_sip_core::prelude::*;
use sipbridge_sip_transport::UdpTransport;
use tokio::net::UdpSocket;
use tokio::time::timeout;

async fn peer() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

async fn receive(socket: &UdpSocket) -> Message {
    let mut buf = vec![0u8; 65_535];
    let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .unwrap();
    parse_message(&buf[..len], &HeaderParserRegistry::default()).unwrap()
}

fn request(method: &str, call_id: &str, from: &str, to: &str, sent_by: SocketAddr) -> String {
    format!(
        "{method} sip:{to} SIP/2.0\r\n\
         Via: SIP/2.0/UDP {sent_by};branch=z9hG4bK-{call_id}\r\n\
         From: <sip:{from}>;tag=f-{call_id}\r\n\
         To: <sip:{to}>\r\n\
         Call-ID: {call_id}\r\n\
         CSeq: 1 {method}\r\n\
         Contact: <sip:{from}@{sent_by}>\r\n\
         Max-Forwards: 70\r\n\
         Content-Length: 0\r\n\r\n"
    )
}

#[tokio::test]
async fn test_register_then_invite_through_relay() {
    let (registrar, registrar_addr) = peer().await;
    let (phone, phone_addr) = peer().await;
    let (carrier, carrier_addr) = peer().await;

    let config = RelayConfig::new("127.0.0.1:0")
        .with_route(RouteConfig::new("a.com").with_backend(registrar_addr.to_string()));
    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let relay = Dispatcher::with_transport(config, transport).unwrap();
    let relay_addr = relay.local_addr().unwrap();
    let stats = relay.stats();
    let engine = relay.engine();
    let shutdown = relay.cancellation_token();
    let running = tokio::spawn(relay.run());

    // REGISTER from the phone goes to the route backend
    let register = request("REGISTER", "reg-1", "bob@a.com", "bob@a.com", phone_addr);
    phone.send_to(register.as_bytes(), relay_addr).await.unwrap();

    let Message::Request(forwarded) = receive(&registrar).await else {
        panic!("registrar expected a request");
    };
    assert_eq!(forwarded.method, Method::Register);
    assert_eq!(forwarded.headers.via().unwrap().sent_by(), relay_addr.to_string());
    assert_eq!(
        forwarded.headers.address(HeaderName::CONTACT).unwrap().uri.host_port(),
        relay_addr.to_string()
    );
    assert_eq!(forwarded.headers.max_forwards(), Some(69));

    let relationship = engine.relationships().get("bob@a.com").unwrap();
    assert_eq!(relationship.connection.addr(), phone_addr);

    // the registrar's answer comes back to the phone
    let ok = Response::from_request(StatusCode::OK, &forwarded);
    registrar.send_to(&ok.to_bytes(), relay_addr).await.unwrap();
    let Message::Response(answer) = receive(&phone).await else {
        panic!("phone expected a response");
    };
    assert_eq!(answer.status, StatusCode::OK);
    assert_eq!(answer.call_id(), "reg-1");

    // a call for bob from an unrouted domain reaches the phone
    let invite = request("INVITE", "inv-1", "carol@b.com", "bob@a.com", carrier_addr);
    carrier.send_to(invite.as_bytes(), relay_addr).await.unwrap();
    let Message::Request(incoming) = receive(&phone).await else {
        panic!("phone expected a request");
    };
    assert_eq!(incoming.method, Method::Invite);
    assert_eq!(incoming.headers.call_id(), Some("inv-1"));

    shutdown.cancel();
    timeout(Duration::from_secs(2), running).await.unwrap().unwrap().unwrap();

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.received, 3);
    assert_eq!(snapshot.forwarded, 3);
    assert_eq!(snapshot.unresolved, 0);
}

#[tokio::test]
async fn test_bad_datagrams_do_not_stop_the_relay() {
    let (carrier, carrier_addr) = peer().await;

    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let relay = Dispatcher::with_transport(RelayConfig::new("127.0.0.1:0"), transport).unwrap();
    let relay_addr = relay.local_addr().unwrap();
    let stats = relay.stats();
    let shutdown = relay.cancellation_token();
    let running = tokio::spawn(relay.run());

    carrier.send_to(b"this is not sip\r\n\r\n", relay_addr).await.unwrap();

    // nobody is registered, so the request is turned away
    let invite = request("INVITE", "inv-2", "carol@b.com", "dave@b.com", carrier_addr);
    carrier.send_to(invite.as_bytes(), relay_addr).await.unwrap();
    let Message::Response(rejection) = receive(&carrier).await else {
        panic!("carrier expected a response");
    };
    assert_eq!(rejection.status, StatusCode::TEMPORARILY_UNAVAILABLE);
    assert_eq!(rejection.call_id(), "inv-2");

    shutdown.cancel();
    timeout(Duration::from_secs(2), running).await.unwrap().unwrap().unwrap();

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.received, 2);
    assert_eq!(snapshot.decode_errors, 1);
    assert_eq!(snapshot.unresolved, 1);
    assert_eq!(snapshot.forwarded, 0);
}
