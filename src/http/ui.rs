//! Browser inbox page.

use axum::response::Html;

pub async fn ui_index() -> Html<&'static str> {
  Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>alle</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; color: #1f2328; }
    header { display: flex; gap: .5rem; align-items: center; padding: .75rem 1rem; border-bottom: 1px solid #ddd; }
    header h1 { font-size: 1.1rem; margin: 0 1rem 0 0; }
    main { display: grid; grid-template-columns: 220px 380px 1fr; height: calc(100vh - 52px); }
    aside, #list, #detail { overflow-y: auto; border-right: 1px solid #eee; }
    aside div, #list div.row { padding: .5rem .75rem; cursor: pointer; border-bottom: 1px solid #f0f0f0; }
    aside div.active, #list div.active { background: #eef4ff; }
    #list div.unread .subj { font-weight: 600; }
    .meta { color: #656d76; font-size: 12px; }
    .badge { background: #f6f8fa; border-radius: 4px; padding: 0 .3rem; font-size: 11px; }
    #detail { padding: 1rem; }
    #detail iframe { width: 100%; height: 60vh; border: 1px solid #eee; }
    #login { max-width: 320px; margin: 15vh auto; display: grid; gap: .5rem; }
    .hidden { display: none !important; }
    .err { color: #cf222e; }
    pre { white-space: pre-wrap; }
  </style>
</head>
<body>
  <form id="login" class="hidden" onsubmit="login(event)">
    <h1>alle</h1>
    <input id="user" placeholder="Username" autocomplete="username" />
    <input id="pass" type="password" placeholder="Password" autocomplete="current-password" />
    <button>Sign in</button>
    <div id="loginErr" class="err"></div>
  </form>
  <div id="app" class="hidden">
    <header>
      <h1>alle</h1>
      <input id="q" placeholder="Search" onkeydown="if(event.key==='Enter')reload()" />
      <label><input id="regex" type="checkbox" onchange="reload()" /> regex</label>
      <label><input id="unread" type="checkbox" onchange="reload()" /> unread</label>
      <select id="type" onchange="reload()">
        <option value="">all types</option>
        <option value="auth_code">Auth code</option>
        <option value="auth_link">Auth link</option>
        <option value="service_link">Service link</option>
        <option value="subscription_link">Subscription link</option>
        <option value="internal_link">Internal link</option>
        <option value="other_link">Other link</option>
        <option value="none">None</option>
      </select>
      <button onclick="markAll()">Mark all read</button>
      <span id="err" class="err"></span>
      <button style="margin-left:auto" onclick="logout()">Sign out</button>
    </header>
    <main>
      <aside id="inboxes"></aside>
      <section id="list" onscroll="maybeMore()"></section>
      <section id="detail"></section>
    </main>
  </div>
  <script>
    const PAGE = 50;
    const state = { inbox: null, items: [], total: 0, loading: false, current: null };
    const token = () => localStorage.getItem('alle.token');
    const esc = s => String(s ?? '').replace(/[&<>"']/g, c => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));

    async function api(path, opts = {}) {
      const headers = Object.assign({ 'Authorization': 'Bearer ' + token() }, opts.headers || {});
      if (opts.body !== undefined) headers['Content-Type'] = 'application/json';
      const res = await fetch(path, Object.assign({}, opts, { headers, body: opts.body === undefined ? undefined : JSON.stringify(opts.body) }));
      const env = await res.json();
      if (res.status === 401) { logout(); throw new Error(env.error); }
      if (!env.success) { document.getElementById('err').textContent = env.error; throw new Error(env.error); }
      document.getElementById('err').textContent = '';
      return env;
    }

    async function login(ev) {
      ev.preventDefault();
      const res = await fetch('/api/auth/login', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ username: user.value, password: pass.value, ttl: 2592000 }),
      });
      const env = await res.json();
      if (!env.success) { loginErr.textContent = env.error; return; }
      localStorage.setItem('alle.token', env.data.token);
      start();
    }

    function logout() {
      localStorage.removeItem('alle.token');
      document.getElementById('app').classList.add('hidden');
      document.getElementById('login').classList.remove('hidden');
    }

    function params(offset) {
      const p = new URLSearchParams({ limit: PAGE, offset });
      const q = document.getElementById('q').value.trim();
      if (q) { p.set('search', q); if (document.getElementById('regex').checked) p.set('search_regex', '1'); }
      if (document.getElementById('unread').checked) p.set('read_status', '0');
      const t = document.getElementById('type').value;
      if (t) p.set('email_type', t);
      if (state.inbox) p.set('recipient', state.inbox);
      return p;
    }

    async function loadInboxes() {
      const env = await api('/api/email/inboxes');
      const all = `<div class="${state.inbox ? '' : 'active'}" data-address="">All inboxes</div>`;
      document.getElementById('inboxes').innerHTML = all + env.data.map(i =>
        `<div class="${i.address === state.inbox ? 'active' : ''}" data-address="${esc(i.address)}">${esc(i.address)}<div class="meta">${i.unread} unread / ${i.total}</div></div>`
      ).join('');
    }

    function pickInbox(addr) { state.inbox = addr; loadInboxes(); reload(); }

    async function reload() {
      state.items = [];
      state.total = 0;
      document.getElementById('list').innerHTML = '';
      await more();
    }

    async function more() {
      if (state.loading) return;
      state.loading = true;
      try {
        const env = await api('/api/email/list?' + params(state.items.length));
        state.items = state.items.concat(env.data);
        state.total = env.total;
        renderList();
      } finally { state.loading = false; }
    }

    function maybeMore() {
      const el = document.getElementById('list');
      if (el.scrollTop + el.clientHeight >= el.scrollHeight - 40 && state.items.length < state.total) more();
    }

    function renderList() {
      document.getElementById('list').innerHTML = state.items.map(m => `
        <div class="row ${m.readStatus ? '' : 'unread'} ${state.current === m.id ? 'active' : ''}" data-id="${m.id}">
          <div class="subj">${esc(m.title || '(no subject)')}</div>
          <div class="meta">${esc(m.fromName || m.fromAddress)} &middot; ${esc(m.sentAt)}</div>
          ${m.emailResult ? `<span class="badge">${esc(m.emailResult)}</span>` : ''}
        </div>`).join('');
    }

    async function show(id) {
      const m = state.items.find(x => x.id === id);
      if (!m) return;
      state.current = id;
      if (!m.readStatus) {
        await api(`/api/email/mark?id=${id}&is_read=1`, { method: 'POST' });
        m.readStatus = 1;
        loadInboxes();
      }
      renderList();
      document.getElementById('detail').innerHTML = `
        <h2>${esc(m.title || '(no subject)')}</h2>
        <div class="meta">From ${esc(m.fromName)} &lt;${esc(m.fromAddress)}&gt; to ${esc(m.toAddress)} &middot; ${esc(m.sentAt)}</div>
        <p><span class="badge">${esc(m.emailType)}</span> ${esc(m.emailResultText || '')} <code>${esc(m.emailResult || '')}</code></p>
        <p>
          <button data-action="unread">Mark unread</button>
          <button data-action="delete">Delete</button>
          <button data-action="translate">Translate</button>
        </p>
        ${m.bodyHtml ? '<iframe id="body" sandbox=""></iframe>' : `<pre id="body">${esc(m.bodyText)}</pre>`}
        <div id="translated"></div>`;
      if (m.bodyHtml) document.getElementById('body').srcdoc = m.bodyHtml;
    }

    async function setRead(id, read) {
      await api(`/api/email/mark?id=${id}&is_read=${read}`, { method: 'POST' });
      const m = state.items.find(x => x.id === id);
      if (m) m.readStatus = read;
      renderList();
      loadInboxes();
    }

    async function removeEmail(id) {
      if (!confirm('Delete this email?')) return;
      await api('/api/email/delete', { method: 'DELETE', body: [id] });
      state.items = state.items.filter(x => x.id !== id);
      state.total -= 1;
      state.current = null;
      document.getElementById('detail').innerHTML = '';
      renderList();
      loadInboxes();
    }

    async function translateEmail(id) {
      const m = state.items.find(x => x.id === id);
      if (!m || !m.bodyText) return;
      const out = document.getElementById('translated');
      out.textContent = 'Translating...';
      const body = { content: m.bodyText };
      if (m.bodyHtml) body.contentHtml = m.bodyHtml;
      const env = await api('/api/email/translate', { method: 'POST', body });
      if (env.data.html) {
        out.innerHTML = '<h3>Translation</h3><iframe id="translatedBody" sandbox=""></iframe>';
        document.getElementById('translatedBody').srcdoc = env.data.html;
      } else {
        out.innerHTML = `<h3>Translation</h3><pre>${esc(env.data.text)}</pre>`;
      }
    }

    async function markAll() {
      const q = state.inbox ? '?recipient=' + encodeURIComponent(state.inbox) : '';
      await api('/api/email/mark-all-read' + q, { method: 'POST' });
      state.items.forEach(m => m.readStatus = 1);
      renderList();
      loadInboxes();
    }

    function start() {
      document.getElementById('login').classList.add('hidden');
      document.getElementById('app').classList.remove('hidden');
      loadInboxes();
      reload();
    }

    document.getElementById('inboxes').addEventListener('click', ev => {
      const el = ev.target.closest('[data-address]');
      if (el) pickInbox(el.dataset.address || null);
    });
    document.getElementById('list').addEventListener('click', ev => {
      const el = ev.target.closest('[data-id]');
      if (el) show(Number(el.dataset.id));
    });
    document.getElementById('detail').addEventListener('click', ev => {
      const el = ev.target.closest('[data-action]');
      if (!el || state.current === null) return;
      const id = state.current;
      if (el.dataset.action === 'unread') setRead(id, 0);
      if (el.dataset.action === 'delete') removeEmail(id);
      if (el.dataset.action === 'translate') translateEmail(id);
    });

    window.addEventListener('load', () => token() ? start() : logout());
  </script>
</body>
</html>
"##;
