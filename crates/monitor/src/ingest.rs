//! Thread de ingestão: leitor de transporte com reconexão.
//!
//! Máquina de três estados: Desconectado → Conectando → Streaming, com
//! volta a Desconectado em qualquer erro de conexão. Política
//! deliberada de "tentar para sempre" com backoff fixo, adequada a um
//! dispositivo que pode ser desligado e religado a qualquer momento;
//! sem backoff exponencial, sem limite de tentativas.

use crate::snapshot::MonitorHandle;
use crate::transport::TransportSource;
use chrono::Local;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Worker de ingestão. Parar = derrubar o canal de shutdown e dar join.
pub struct IngestWorker {
    thread: Option<JoinHandle<()>>,
    shutdown: Sender<()>,
}

impl IngestWorker {
    /// Sobe a thread de ingestão sobre uma fonte de transporte.
    pub fn spawn<S>(mut source: S, monitor: MonitorHandle, backoff: Duration) -> Self
    where
        S: TransportSource + Send + 'static,
    {
        let (shutdown, rx) = bounded::<()>(1);

        let thread = std::thread::Builder::new()
            .name("postura-ingest".into())
            .spawn(move || ingest_loop(&mut source, &monitor, backoff, &rx))
            .expect("Falha ao criar thread de ingestão");

        Self {
            thread: Some(thread),
            shutdown,
        }
    }

    /// Encerra o worker e espera a thread terminar. Uma leitura
    /// bloqueante em andamento só é abandonada no tick seguinte; o
    /// cancelamento é em nível de processo, não por mensagem.
    pub fn stop(mut self) {
        drop(self.shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn ingest_loop<S: TransportSource>(
    source: &mut S,
    monitor: &MonitorHandle,
    backoff: Duration,
    shutdown: &Receiver<()>,
) {
    loop {
        match source.connect() {
            Ok(()) => {
                monitor.set_connected(true);
                info!("Transporte conectado: {}", source.describe());

                stream(source, monitor, shutdown);

                // Toda saída do streaming libera o handle e derruba a flag
                source.close();
                monitor.set_connected(false);
            }
            Err(e) => {
                error!(
                    "Falha ao conectar {}: {e}. Nova tentativa em {:.0}s",
                    source.describe(),
                    backoff.as_secs_f64()
                );
            }
        }

        // Backoff fixo, interrompível pela parada
        match shutdown.recv_timeout(backoff) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => break, // sinal recebido ou canal fechado
        }
    }

    source.close();
    monitor.set_connected(false);
    info!("Thread de ingestão encerrada");
}

/// Consome mensagens até a conexão cair ou a parada ser pedida.
fn stream<S: TransportSource>(
    source: &mut S,
    monitor: &MonitorHandle,
    shutdown: &Receiver<()>,
) {
    loop {
        if should_stop(shutdown) {
            return;
        }

        match source.read_next() {
            Ok(Some(raw)) => match postura_core::decode_sample(&raw, Local::now()) {
                Ok(telemetry) => {
                    debug!(
                        "Amostra aceita: postura ruim = {}",
                        telemetry.any_bad_posture()
                    );
                    monitor.ingest(telemetry);
                }
                // Falha de decodificação não é fatal: descarta a
                // mensagem e a amostra anterior segue como atual
                Err(e) => warn!("Amostra descartada: {e}"),
            },
            Ok(None) => {} // tick silencioso (timeout, datagrama filtrado)
            Err(e) => {
                warn!("Conexão perdida: {e}");
                return;
            }
        }
    }
}

fn should_stop(shutdown: &Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    const SAMPLE_OK: &[u8] = br#"{"lumbar":{"angulo":1.0,"malaPostura":true},
                                  "toracico":{"angulo":2.0,"malaPostura":false},
                                  "hombro":{"angulo":3.0,"malaPostura":false}}"#;
    const SAMPLE_GOOD_POSTURE: &[u8] = br#"{"lumbar":{"angulo":4.0,"malaPostura":false},
                                            "toracico":{"angulo":5.0,"malaPostura":false},
                                            "hombro":{"angulo":6.0,"malaPostura":false}}"#;

    /// Fonte roteirizada: uma lista de resultados de connect e, para
    /// cada sessão, uma lista de leituras. Roteiro esgotado = ticks
    /// silenciosos (o worker fica ocioso até o stop).
    struct FakeSource {
        connects: VecDeque<Result<(), TransportError>>,
        sessions: VecDeque<VecDeque<Result<Option<Vec<u8>>, TransportError>>>,
        reads: VecDeque<Result<Option<Vec<u8>>, TransportError>>,
        /// Gate opcional de ritmo: cada leitura roteirizada só é
        /// entregue depois de um sinal do teste, permitindo observar
        /// estados intermediários sem corrida
        gate: Option<Receiver<()>>,
        /// Flag de conectividade observada no início de cada connect
        flags_at_connect: Arc<Mutex<Vec<bool>>>,
        monitor: MonitorHandle,
    }

    impl FakeSource {
        fn new(
            monitor: MonitorHandle,
            connects: Vec<Result<(), TransportError>>,
            sessions: Vec<Vec<Result<Option<Vec<u8>>, TransportError>>>,
        ) -> (Self, Arc<Mutex<Vec<bool>>>) {
            let flags = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    connects: connects.into_iter().collect(),
                    sessions: sessions.into_iter().map(|s| s.into_iter().collect()).collect(),
                    reads: VecDeque::new(),
                    gate: None,
                    flags_at_connect: flags.clone(),
                    monitor,
                },
                flags,
            )
        }
    }

    impl TransportSource for FakeSource {
        fn describe(&self) -> String {
            "fake".into()
        }

        fn connect(&mut self) -> Result<(), TransportError> {
            self.flags_at_connect
                .lock()
                .unwrap()
                .push(self.monitor.status().connected);

            match self.connects.pop_front() {
                Some(Ok(())) => {
                    self.reads = self.sessions.pop_front().unwrap_or_default();
                    Ok(())
                }
                Some(Err(e)) => Err(e),
                None => Err(TransportError::Open(std::io::Error::other("roteiro esgotado"))),
            }
        }

        fn read_next(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            if !self.reads.is_empty() {
                if let Some(gate) = &self.gate {
                    if gate.recv().is_err() {
                        // Gate fechado pelo teste: vira tick ocioso
                        std::thread::sleep(Duration::from_millis(1));
                        return Ok(None);
                    }
                }
            }
            match self.reads.pop_front() {
                Some(step) => step,
                // Ocioso até o worker ser parado
                None => {
                    std::thread::sleep(Duration::from_millis(1));
                    Ok(None)
                }
            }
        }

        fn close(&mut self) {}
    }

    fn open_err() -> TransportError {
        TransportError::Open(std::io::Error::other("porta ocupada"))
    }

    fn wait_until(what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timeout esperando: {what}");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn retries_connect_and_only_flags_connected_after_success() {
        let monitor = MonitorHandle::new();
        let (source, flags) = FakeSource::new(
            monitor.clone(),
            vec![Err(open_err()), Err(open_err()), Err(open_err()), Ok(())],
            vec![vec![Ok(Some(SAMPLE_OK.to_vec()))]],
        );

        let worker = IngestWorker::spawn(source, monitor.clone(), Duration::from_millis(5));

        wait_until("amostra aceita", || monitor.history().len() == 1);
        assert!(monitor.status().connected);

        // A flag estava falsa no início de todas as 4 tentativas,
        // inclusive na que deu certo
        assert_eq!(*flags.lock().unwrap(), vec![false, false, false, false]);

        worker.stop();
    }

    #[test]
    fn stream_error_reconnects_and_resumes() {
        let monitor = MonitorHandle::new();
        let (source, _) = FakeSource::new(
            monitor.clone(),
            vec![Ok(()), Ok(())],
            vec![
                vec![
                    Ok(Some(SAMPLE_OK.to_vec())),
                    Err(TransportError::Read(std::io::Error::other("caiu"))),
                ],
                vec![Ok(Some(SAMPLE_GOOD_POSTURE.to_vec()))],
            ],
        );

        let worker = IngestWorker::spawn(source, monitor.clone(), Duration::from_millis(5));

        wait_until("duas amostras aceitas", || monitor.history().len() == 2);
        assert!(monitor.status().connected);

        worker.stop();

        // Depois da parada a flag cai, mas os dados velhos permanecem
        let snap = monitor.current();
        assert!(!snap.connected);
        assert_eq!(snap.telemetry.unwrap().lumbar.angle, 4.0);
    }

    #[test]
    fn decode_failure_drops_message_without_touching_state() {
        // Uma amostra válida primeiro, depois as malformadas e uma
        // sentinela válida: quando a sentinela chega, as ruins já
        // passaram pelo decoder, e o estado entre as duas válidas tem
        // que ser idêntico ao snapshot anterior às falhas.
        let monitor = MonitorHandle::new();
        let (mut source, _) = FakeSource::new(
            monitor.clone(),
            vec![Ok(())],
            vec![vec![
                Ok(Some(SAMPLE_OK.to_vec())),
                Ok(Some(b"{\"lumbar\":".to_vec())),                  // malformada
                Ok(Some(b"{\"lumbar\":{\"angulo\":1.0}}".to_vec())), // campo faltante
                Ok(Some(SAMPLE_GOOD_POSTURE.to_vec())),              // sentinela
            ]],
        );

        // Ritmo controlado: cada leitura espera um sinal, então o
        // snapshot é capturado de fato antes das mensagens ruins
        let (permit, gate) = bounded::<()>(4);
        source.gate = Some(gate);

        let worker = IngestWorker::spawn(source, monitor.clone(), Duration::from_millis(5));

        permit.send(()).unwrap(); // libera a primeira amostra válida
        wait_until("primeira amostra aceita", || monitor.history().len() == 1);
        let today = Local::now().date_naive();
        let events_before = monitor.events(20);
        let stats_before = monitor.statistics_on(today);
        let history_before = monitor.history();

        for _ in 0..3 {
            permit.send(()).unwrap(); // libera as malformadas e a sentinela
        }
        wait_until("sentinela aceita", || monitor.history().len() == 2);

        // As mensagens ruins não anexaram histórico, evento nem
        // estatística: só a sentinela entrou depois do snapshot
        assert_eq!(monitor.events(20), events_before);
        assert_eq!(monitor.statistics_on(today), stats_before);
        assert_eq!(monitor.history()[0], history_before[0]);
        assert_eq!(stats_before.total_bad_events, 1);

        // E entre as falhas a amostra aceita anterior seguiu como
        // atual: a atual só mudou com a sentinela (ângulo 4.0)
        assert_eq!(monitor.history()[0].lumbar_angle, 1.0);
        assert_eq!(monitor.current().telemetry.unwrap().lumbar.angle, 4.0);

        worker.stop();
    }

    #[test]
    fn edge_triggered_events_across_the_pipeline() {
        // alert = [F, T, T, F, T] → exatamente 2 eventos
        let monitor = MonitorHandle::new();
        let seq = [false, true, true, false, true];
        let reads: Vec<_> = seq
            .iter()
            .map(|&bad| {
                let raw = format!(
                    "{{\"lumbar\":{{\"angulo\":0,\"malaPostura\":{bad}}},\
                      \"toracico\":{{\"angulo\":0,\"malaPostura\":false}},\
                      \"hombro\":{{\"angulo\":0,\"malaPostura\":false}}}}"
                );
                Ok(Some(raw.into_bytes()))
            })
            .collect();

        let (source, _) = FakeSource::new(monitor.clone(), vec![Ok(())], vec![reads]);
        let worker = IngestWorker::spawn(source, monitor.clone(), Duration::from_millis(5));

        wait_until("cinco amostras aceitas", || monitor.history().len() == 5);
        let stats = monitor.statistics_on(Local::now().date_naive());
        assert_eq!(stats.total_bad_events, 2);
        assert_eq!(stats.bad_events_today, 2);
        assert_eq!(monitor.events(20).len(), 2);

        worker.stop();
    }
}
